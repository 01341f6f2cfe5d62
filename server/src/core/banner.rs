//! Startup banner and URL display

use super::config::is_all_interfaces;
use super::constants::APP_NAME;

/// Print the startup banner with URLs
pub fn print_banner(host: &str, port: u16, auth_enabled: bool, data_dir: &str, template: &str) {
    let display_host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    };

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();

    const W: usize = 10;

    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m http://{}:{}/api/v1/reports/equipment",
        "Reports:", display_host, port
    );
    println!(
        "  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m http://{}:{}/api/openapi.json",
        "OpenAPI:", display_host, port
    );

    if host == "127.0.0.1" || host == "localhost" {
        println!(
            "  \x1b[90m➜  {:<W$} use --host 0.0.0.0 to expose\x1b[0m",
            "Network:"
        );
    } else if is_all_interfaces(host) {
        if let Ok(interfaces) = local_ip_address::list_afinet_netifas() {
            for (_, ip) in interfaces
                .iter()
                .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
            {
                println!(
                    "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m http://{}:{}",
                    "Network:", ip, port
                );
            }
        }
    } else {
        println!(
            "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m http://{}:{}",
            "Network:", host, port
        );
    }

    if !auth_enabled {
        println!(
            "  \x1b[31m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m disabled (local superadmin)",
            "Auth:"
        );
    }
    println!("  \x1b[90m➜  {:<W$} {}\x1b[0m", "Data:", data_dir);
    println!("  \x1b[90m➜  {:<W$} {}\x1b[0m", "Template:", template);

    println!();
}
