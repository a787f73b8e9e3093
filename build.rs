use std::env;
use std::process::Command;

/// Exports `NS_BUILD_INFO` for `--version`: the git revision, plus the
/// reproducible-build epoch when one is set.
fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let revision = git(&["describe", "--always", "--dirty", "--abbrev=8"]).unwrap_or_else(|| "no-git".into());
    let info = match env::var("SOURCE_DATE_EPOCH") {
        Ok(epoch) if !epoch.trim().is_empty() => format!("{revision}, epoch {}", epoch.trim()),
        _ => revision,
    };

    println!("cargo:rustc-env=NS_BUILD_INFO={info}");
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
