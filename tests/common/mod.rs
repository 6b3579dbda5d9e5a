//! Project fixture shared by the CLI and testscript suites
#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::Path;

/// Compiler file name referenced from the fixture's `svcbuild.toml`
pub const FAKE_GO_NAME: &str = "fake-go.sh";

// Stands in for `go build`: writes a shell script to the `-o` path. The
// "binary" echoes its name and arguments and exits 1 when the first argument
// is `fail`. FAKE_GO_FAIL=<service> makes the compile of that service fail.
pub const FAKE_GO: &str = r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift ;;
  esac
  shift
done
[ -n "$out" ] || exit 2
echo "$out $GOOS/$GOARCH cgo=$CGO_ENABLED" >> compile.log
case "$out" in
  */"$FAKE_GO_FAIL"|*/"$FAKE_GO_FAIL".exe) echo "syntax error in $FAKE_GO_FAIL" >&2; exit 1 ;;
esac
cat > "$out" <<'EOF'
#!/bin/sh
echo "$(basename "$0") $*"
[ "$1" = "fail" ] && exit 1
exit 0
EOF
chmod +x "$out"
"#;

/// Write the fake compiler into `dir`
#[cfg(unix)]
pub fn write_fake_go(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let compiler = dir.join(FAKE_GO_NAME);
    fs::write(&compiler, FAKE_GO)?;
    fs::set_permissions(&compiler, fs::Permissions::from_mode(0o755))
}

/// Turn `dir` into a project built by the fake compiler; `extra_config` is
/// appended to the generated `svcbuild.toml`
#[cfg(unix)]
pub fn write_project(dir: &Path, extra_config: &str) -> io::Result<()> {
    write_fake_go(dir)?;
    fs::write(
        dir.join("svcbuild.toml"),
        format!("[build]\ncompiler = \"{}\"\n\n{}", FAKE_GO_NAME, extra_config),
    )
}
