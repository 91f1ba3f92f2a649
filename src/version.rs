/// One-line build description printed by `--version`.
pub fn print(program: &str) -> String {
    format!(
        "{program}, version {} ({} {}/{})",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_NAME"),
        std::env::consts::OS,
        std::env::consts::ARCH,
    )
}
