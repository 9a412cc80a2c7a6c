//! Build-console diagnostics.
//!
//! Policy violations are advisory: they are printed with a two-part colored
//! prefix/message and the transform proceeds with a corrected assumption.

use std::env;

pub const LOG_PREFIX: &str = "[next-load] ERROR";

const HYDRATE_DOCS: &str = "For more information, please refer to the documentation provided at https://github.com/aralroca/next-load#hydrate.";

fn color_enabled() -> bool {
    env::var_os("NODE_DISABLE_COLORS").is_none()
        && env::var_os("NO_COLOR").is_none()
        && env::var("TERM").map(|t| t != "dumb").unwrap_or(true)
        && env::var("FORCE_COLOR").map(|f| f != "0").unwrap_or(true)
}

pub fn color_red(text: &str) -> String {
    if color_enabled() {
        format!("\x1b[31m{}\x1b[0m", text)
    } else {
        text.to_string()
    }
}

pub fn color_orange(text: &str) -> String {
    if color_enabled() {
        format!("\x1b[33m{}\x1b[0m", text)
    } else {
        text.to_string()
    }
}

fn format_plugin_error(message: &str) -> String {
    format!(
        "{} {}",
        color_red(LOG_PREFIX),
        color_orange(&format!("{} {}", message, HYDRATE_DOCS))
    )
}

/// Print an advisory plugin error. Never aborts the build.
pub fn log_plugin_error(message: &str) {
    println!("{}", format_plugin_error(message));
}

pub fn hydrate_without_load_message() -> &'static str {
    "The function \"hydrate\" can only be used together with \"load\"."
}

pub fn hydrate_on_client_page_message() -> &'static str {
    "The \"hydrate\" function is exclusively accessible within a server page. To achieve similar functionality, utilize the \"load\" function."
}
