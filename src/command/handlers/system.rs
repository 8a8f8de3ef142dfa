//! Introspection: get_system_info

use crate::core::error::HandlerResult;
use sysinfo::{CpuRefreshKind, RefreshKind, System};

pub fn get_system_info() -> HandlerResult {
    let system =
        System::new_with_specifics(RefreshKind::new().with_cpu(CpuRefreshKind::new()));

    let name = System::name().unwrap_or_else(|| std::env::consts::OS.to_string());
    let release = System::kernel_version().unwrap_or_else(|| "unknown".to_string());
    let processor = system
        .cpus()
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .filter(|brand| !brand.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    Ok(format_info(&name, &release, std::env::consts::ARCH, &processor))
}

fn format_info(name: &str, release: &str, machine: &str, processor: &str) -> String {
    format!(
        "OS: {} {}\nMachine: {}\nProcessor: {}",
        name, release, machine, processor
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_info_layout() {
        assert_eq!(
            format_info("Linux", "6.1.0", "x86_64", "AMD Ryzen"),
            "OS: Linux 6.1.0\nMachine: x86_64\nProcessor: AMD Ryzen"
        );
    }

    #[test]
    fn test_get_system_info_has_three_lines() {
        let info = get_system_info().unwrap();
        let lines: Vec<_> = info.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("OS: "));
        assert_eq!(lines[1], format!("Machine: {}", std::env::consts::ARCH));
        assert!(lines[2].starts_with("Processor: "));
    }
}
