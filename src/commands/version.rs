use std::{env, fmt::Write as _};

use crate::app_info::AppInfo;

/// Name, version and build metadata; the build values come from compile-time env vars.
#[must_use]
pub fn version_info(app: AppInfo) -> String {
    let build = |key: Option<&'static str>| key.unwrap_or("unknown");

    let mut info = format!("📦 {} v{}\n", app.name, app.version);

    if !app.description.is_empty() {
        let _ = writeln!(info, "📝 {}", app.description);
    }

    let _ = write!(
        info,
        "\n🔨 Build: git {} built {} with rustc {}\n💻 Runtime: {} / {}",
        build(option_env!("GIT_HASH")),
        build(option_env!("BUILD_TIMESTAMP")),
        build(option_env!("RUSTC_VERSION")),
        env::consts::OS,
        env::consts::ARCH,
    );

    info
}

pub fn print_version_info(app: AppInfo) {
    println!("{}", version_info(app));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info_names_the_binary() {
        let info = version_info(AppInfo::cadence());

        assert!(info.starts_with(&format!("📦 cadence v{}", env!("CARGO_PKG_VERSION"))));
        assert!(info.contains(env::consts::OS));
    }
}
