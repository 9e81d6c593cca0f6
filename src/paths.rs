use std::env;
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = "monthly_widget";
const CONFIG_FILE: &str = "config.toml";
const FALLBACK_CONFIG_FILE: &str = "monthly_widget.toml";

pub fn resolve_config_path(cli_path: Option<PathBuf>) -> PathBuf {
	if let Some(path) = cli_path {
		return absolutize(path);
	}

	if let Some(path) = env::var_os("MONTHLY_WIDGET_CONFIG") {
		let path = PathBuf::from(path);
		if !path.as_os_str().is_empty() {
			return absolutize(path);
		}
	}

	config_dir()
		.map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
		.unwrap_or_else(|| absolutize(PathBuf::from(FALLBACK_CONFIG_FILE)))
}

fn config_dir() -> Option<PathBuf> {
	#[cfg(target_os = "windows")]
	{
		if let Some(path) = env::var_os("APPDATA") {
			return Some(PathBuf::from(path));
		}
	}

	if let Some(path) = env::var_os("XDG_CONFIG_HOME") {
		let path = PathBuf::from(path);
		if path.is_absolute() {
			return Some(path);
		}
	}

	env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
}

fn absolutize(path: PathBuf) -> PathBuf {
	let path = if path.is_absolute() {
		path
	} else if let Ok(cwd) = env::current_dir() {
		cwd.join(path)
	} else {
		path
	};

	if path.exists() {
		fs::canonicalize(&path).unwrap_or(path)
	} else {
		path
	}
}
