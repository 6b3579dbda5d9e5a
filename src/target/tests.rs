#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::constants::platform;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_resolve_defaults_to_host() {
        let target = BuildTarget::resolve(lookup(&[]));
        assert_eq!(target, BuildTarget::host());
    }

    #[test]
    fn test_resolve_empty_override_is_ignored() {
        let target =
            BuildTarget::resolve(lookup(&[(env::TARGET_OS, ""), (env::TARGET_ARCH, "  ")]));
        assert_eq!(target, BuildTarget::host());
    }

    #[test]
    fn test_resolve_overrides() {
        let target = BuildTarget::resolve(lookup(&[
            (env::TARGET_OS, "windows"),
            (env::TARGET_ARCH, "arm64"),
        ]));
        assert_eq!(target, BuildTarget::new("windows", "arm64"));

        let only_arch = BuildTarget::resolve(lookup(&[(env::TARGET_ARCH, "riscv64")]));
        assert_eq!(only_arch.os, BuildTarget::host().os);
        assert_eq!(only_arch.arch, "riscv64");
    }

    #[test]
    fn test_host_uses_go_names() {
        assert_eq!(host_os_name("macos"), "darwin");
        assert_eq!(host_os_name("linux"), "linux");
        assert_eq!(host_arch_name("x86_64"), "amd64");
        assert_eq!(host_arch_name("aarch64"), "arm64");
        assert_eq!(host_arch_name("x86"), "386");
        assert_eq!(host_arch_name("s390x"), "s390x");
    }

    #[test]
    fn test_parse_platform() {
        let target = BuildTarget::parse_platform(platform::LINUX_ARM64).unwrap();
        assert_eq!(target.os, "linux");
        assert_eq!(target.arch, "arm64");
        assert_eq!(target.to_string(), platform::LINUX_ARM64);
    }

    #[test]
    fn test_parse_platform_invalid() {
        for bad in ["linux", "linux/", "/amd64", "linux/arm/v7", ""] {
            let err = BuildTarget::parse_platform(bad).unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<PipelineError>(),
                    Some(PipelineError::Config { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_executable_name() {
        let windows = BuildTarget::parse_platform(platform::WINDOWS_AMD64).unwrap();
        assert!(windows.is_windows());
        assert_eq!(windows.executable_name("service-1"), "service-1.exe");

        assert!(BuildTarget::new("Windows", "amd64").is_windows());

        let linux = BuildTarget::parse_platform(platform::LINUX_AMD64).unwrap();
        assert!(!linux.is_windows());
        assert_eq!(linux.executable_name("service-1"), "service-1");
    }

    #[test]
    fn test_platform_names_are_lowercased() {
        let target = BuildTarget::parse_platform("Windows/AMD64").unwrap();
        assert_eq!(target, BuildTarget::new("windows", "amd64"));
        assert_eq!(target.to_string(), platform::WINDOWS_AMD64);
        assert_eq!(target.executable_name("service-1"), "service-1.exe");
        assert_eq!(target.rust_triple().unwrap(), "x86_64-pc-windows-msvc");

        let from_env = BuildTarget::resolve(lookup(&[
            (env::TARGET_OS, " Darwin "),
            (env::TARGET_ARCH, "ARM64"),
        ]));
        assert_eq!(from_env.to_string(), platform::DARWIN_ARM64);
    }

    #[test]
    fn test_rust_triple() {
        let triple = |p: &str| BuildTarget::parse_platform(p).unwrap().rust_triple();
        assert_eq!(
            triple(platform::LINUX_AMD64).unwrap(),
            "x86_64-unknown-linux-musl"
        );
        assert_eq!(
            triple(platform::LINUX_ARM64).unwrap(),
            "aarch64-unknown-linux-musl"
        );
        assert_eq!(
            triple(platform::DARWIN_ARM64).unwrap(),
            "aarch64-apple-darwin"
        );
        assert_eq!(
            triple(platform::WINDOWS_AMD64).unwrap(),
            "x86_64-pc-windows-msvc"
        );
        let err = triple("plan9/amd64").unwrap_err();
        assert!(err.to_string().contains("plan9/amd64"));
    }
}
