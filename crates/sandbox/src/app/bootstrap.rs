use std::path::PathBuf;

use tilemove::AntilagOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const ANTILAG_ENV_VAR: &str = "TILEMOVE_ANTILAG";

pub(crate) struct AppWiring {
    pub(crate) scenario_path: PathBuf,
    pub(crate) options: AntilagOptions,
}

pub(crate) fn build_app(mut args: impl Iterator<Item = String>) -> Option<AppWiring> {
    init_tracing();
    info!("=== tilemove sandbox ===");

    let scenario_path = args.nth(1).map(PathBuf::from)?;
    let options = parse_antilag_from_env();
    info!(
        scenario = %scenario_path.display(),
        flat_passages = options.flat_passages,
        indexed_occupants = options.indexed_occupants,
        incremental_sprites = options.incremental_sprites,
        "sandbox_configured"
    );

    Some(AppWiring {
        scenario_path,
        options,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn parse_antilag_from_env() -> AntilagOptions {
    let raw = std::env::var(ANTILAG_ENV_VAR).ok();
    let (options, unknown) = parse_antilag(raw.as_deref());
    for name in unknown {
        warn!(flag = %name, env = ANTILAG_ENV_VAR, "unknown_antilag_flag");
    }
    options
}

/// `on`/`off` switch every path; anything else is a comma list of flags
/// enabled on top of all-off. Unset means all-on.
fn parse_antilag(raw: Option<&str>) -> (AntilagOptions, Vec<String>) {
    let Some(raw) = raw.map(str::trim) else {
        return (AntilagOptions::default(), Vec::new());
    };
    match raw.to_ascii_lowercase().as_str() {
        "" | "on" | "all" => return (AntilagOptions::all(true), Vec::new()),
        "off" | "none" => return (AntilagOptions::all(false), Vec::new()),
        _ => {}
    }

    let mut options = AntilagOptions::all(false);
    let unknown = raw
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter(|entry| !options.set_flag(entry, true))
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    (options, unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_and_on_enable_everything() {
        assert_eq!(parse_antilag(None).0, AntilagOptions::all(true));
        assert_eq!(parse_antilag(Some(" ON ")).0, AntilagOptions::all(true));
        assert_eq!(parse_antilag(Some("")).0, AntilagOptions::all(true));
    }

    #[test]
    fn off_disables_everything() {
        let (options, unknown) = parse_antilag(Some("off"));
        assert_eq!(options, AntilagOptions::all(false));
        assert!(unknown.is_empty());
    }

    #[test]
    fn flag_list_enables_only_named_paths() {
        let (options, unknown) = parse_antilag(Some("flat_passages, cull_offscreen,,"));
        assert!(options.flat_passages);
        assert!(options.cull_offscreen);
        assert!(!options.flat_bushes);
        assert!(!options.indexed_occupants);
        assert!(!options.incremental_sprites);
        assert!(unknown.is_empty());
    }

    #[test]
    fn unknown_flags_are_reported() {
        let (options, unknown) = parse_antilag(Some("flat_bushes,warp_drive"));
        assert!(options.flat_bushes);
        assert_eq!(unknown, vec!["warp_drive".to_string()]);
    }
}
