fn main() {
    // HEADが変わったら再ビルド（コミット、チェックアウトなど）
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let described = std::process::Command::new("git")
        .args(["describe", "--always", "--dirty", "--tags"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string());

    // gitが無い環境ではパッケージのバージョンのみ
    let pkg = env!("CARGO_PKG_VERSION");
    let version = match described {
        Some(rev) if !rev.is_empty() => format!("{} ({})", pkg, rev),
        _ => pkg.to_string(),
    };

    println!("cargo:rustc-env=GIT_VERSION={}", version);
}
