//! Example: Extract cookies from every browser profile on this machine.
//!
//! Usage: cargo run --example cookieextract [domain-suffix] [--netscape]
//!
//! Note: Browsers keep their databases open while running; the stores are
//! opened read-only and immutable, so a running browser's latest writes may
//! not be visible.

use browsercookies::cookies::export;
use browsercookies::cookies::filter::{self, Filter};
use browsercookies::cookies::finder::FinderRegistry;

fn main() {
    let mut suffix = None;
    let mut netscape = false;
    for arg in std::env::args().skip(1) {
        if arg == "--netscape" {
            netscape = true;
        } else {
            suffix = Some(arg);
        }
    }

    let by_suffix = suffix.map(|s: String| filter::domain_has_suffix(s));
    let mut filters: Vec<&dyn Filter> = Vec::new();
    filters.push(&filter::valid);
    if let Some(f) = &by_suffix {
        filters.push(f);
    }

    let registry = FinderRegistry::with_defaults();
    println!("=== Browser Cookie Extraction Example ===");
    println!("Registered browsers: {}\n", registry.browsers().join(", "));

    for readout in registry.read_all_cookies(&filters) {
        let info = &readout.info;
        println!(
            "--- {} ({}{}) ---",
            info.browser,
            if info.profile.is_empty() { "-" } else { info.profile.as_str() },
            if info.is_default_profile { ", default" } else { "" }
        );
        println!("  Database: {}", info.file_name.display());

        let cookies = match readout.result {
            Ok(cookies) => cookies,
            Err(e) => {
                println!("  Error: {}\n", e);
                continue;
            }
        };

        if netscape {
            print!("{}", export::to_netscape(&cookies));
            println!();
            continue;
        }

        println!("  Found {} cookies", cookies.len());
        for cookie in cookies.iter().take(5) {
            let value: String = cookie.value.chars().take(20).collect();
            println!(
                "    - {} = {}{} (domain: {}, secure: {})",
                cookie.name,
                value,
                if cookie.value.chars().count() > 20 { "..." } else { "" },
                cookie.domain,
                cookie.secure
            );
        }
        if cookies.len() > 5 {
            println!("    ... and {} more", cookies.len() - 5);
        }
        println!();
    }
}
