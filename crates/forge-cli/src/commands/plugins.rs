//! Front-end plugins known to `forge serve`.

use colored::Colorize;

pub struct PluginInfo {
    pub name: &'static str,
    pub description: &'static str,
    /// Environment variables the plugin reads.
    pub env: &'static [&'static str],
}

pub const AVAILABLE: &[PluginInfo] = &[
    PluginInfo {
        name: "a2a",
        description: "A2A JSON-RPC server with an agent card",
        env: &["FORGE_A2A_HOST", "FORGE_A2A_PORT"],
    },
    PluginInfo {
        name: "telegram",
        description: "Telegram bot using long polling",
        env: &["TELEGRAM_TOKEN"],
    },
];

pub fn find(name: &str) -> Option<&'static PluginInfo> {
    AVAILABLE.iter().find(|p| p.name == name)
}

pub fn execute() {
    println!("{}", "Available plugins".bold());
    for plugin in AVAILABLE {
        println!(
            "  {:<10} {} {}",
            plugin.name.cyan(),
            plugin.description,
            format!("[{}]", plugin.env.join(", ")).dimmed()
        );
    }
}
