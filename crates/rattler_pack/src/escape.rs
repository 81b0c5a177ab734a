//! Escaping of paths before they cross a shell or process boundary

use crate::platform::HostPlatform;
use std::borrow::Cow;

/// Escape a single argument for the given platform.
///
/// The value is trimmed first. On POSIX shells every ASCII character outside
/// of letters, digits and `_-./,:@+=%` is prefixed with a backslash, as is any
/// non-ASCII whitespace. A newline, which a backslash would swallow as a line
/// continuation, is written as `'\n'` instead. On Windows the value is wrapped
/// in double quotes when it contains whitespace or a double quote, following
/// the argv rules of the MSVC runtime. Values without special characters come
/// back unchanged.
pub fn escape_arg(raw: &str, platform: HostPlatform) -> Cow<'_, str> {
    let arg = raw.trim();
    match platform {
        HostPlatform::Windows => quote_windows(arg),
        HostPlatform::MacOs | HostPlatform::Unix => escape_posix(arg),
    }
}

fn needs_posix_escape(c: char) -> bool {
    if c.is_ascii() {
        !(c.is_ascii_alphanumeric()
            || matches!(c, '_' | '-' | '.' | '/' | ',' | ':' | '@' | '+' | '=' | '%'))
    } else {
        c.is_whitespace()
    }
}

fn escape_posix(arg: &str) -> Cow<'_, str> {
    if !arg.chars().any(needs_posix_escape) {
        return Cow::Borrowed(arg);
    }

    let mut escaped = String::with_capacity(arg.len() + 8);
    for c in arg.chars() {
        if c == '\n' {
            escaped.push_str("'\n'");
            continue;
        }
        if needs_posix_escape(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}

fn quote_windows(arg: &str) -> Cow<'_, str> {
    if !arg.chars().any(|c| c == '"' || c.is_whitespace()) {
        return Cow::Borrowed(arg);
    }

    let mut quoted = String::with_capacity(arg.len() + 4);
    quoted.push('"');
    let mut backslashes = 0usize;
    for c in arg.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                // Backslashes before a quote are literal only when doubled.
                quoted.extend(std::iter::repeat_n('\\', backslashes * 2 + 1));
                quoted.push('"');
                backslashes = 0;
            }
            _ => {
                quoted.extend(std::iter::repeat_n('\\', backslashes));
                quoted.push(c);
                backslashes = 0;
            }
        }
    }
    quoted.extend(std::iter::repeat_n('\\', backslashes * 2));
    quoted.push('"');
    Cow::Owned(quoted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("plain/path/file.txt")]
    #[case("  padded/path  ")]
    #[case("C:\\dist\\app")]
    #[case("unicode/naïve-ß")]
    fn test_plain_paths_are_only_trimmed(#[case] raw: &str) {
        let expected = raw.trim();
        assert_eq!(escape_arg(raw, HostPlatform::Windows), expected);
        if !raw.contains('\\') {
            assert_eq!(escape_arg(raw, HostPlatform::Unix), expected);
            assert_eq!(escape_arg(raw, HostPlatform::MacOs), expected);
        }
    }

    #[test]
    fn test_posix_escapes_every_space() {
        let escaped = escape_arg("my app/with many spaces", HostPlatform::Unix);
        assert_eq!(escaped, "my\\ app/with\\ many\\ spaces");
        assert_eq!(escaped.matches("\\ ").count(), 3);
    }

    #[rstest]
    #[case("a\"b", "a\\\"b")]
    #[case("it's", "it\\'s")]
    #[case("$HOME/x", "\\$HOME/x")]
    #[case("`id`", "\\`id\\`")]
    #[case("back\\slash", "back\\\\slash")]
    #[case("tab\there", "tab\\\there")]
    fn test_posix_special_characters(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(escape_arg(raw, HostPlatform::Unix), expected);
    }

    #[rstest]
    #[case("My App (x64)", "My\\ App\\ \\(x64\\)")]
    #[case("x;id>PWNED;y", "x\\;id\\>PWNED\\;y")]
    #[case("[ab]?*", "\\[ab\\]\\?\\*")]
    #[case("~/{a,b}#!", "\\~/\\{a,b\\}\\#\\!")]
    #[case("a|b&c", "a\\|b\\&c")]
    #[case("line\nbreak", "line'\n'break")]
    fn test_posix_shell_metacharacters(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(escape_arg(raw, HostPlatform::Unix), expected);
    }

    /// Let `sh` parse `escaped` and return the number of words and the first one
    #[cfg(unix)]
    fn sh_words(escaped: &str, cwd: &std::path::Path) -> (String, String) {
        let output = std::process::Command::new("sh")
            .arg("-c")
            .arg(format!("set -- {escaped}; printf '%s\\n' \"$#\"; printf '%s' \"$1\""))
            .current_dir(cwd)
            .output()
            .unwrap();
        assert!(output.status.success(), "sh rejected `{escaped}`");
        let stdout = String::from_utf8(output.stdout).unwrap();
        let (count, word) = stdout.split_once('\n').unwrap();
        (count.to_string(), word.to_string())
    }

    #[cfg(unix)]
    #[rstest]
    #[case("dir with spaces/file name.txt")]
    #[case("$(touch pwned)")]
    #[case("x;touch pwned;y")]
    #[case("a && touch pwned || b")]
    #[case("out > pwned < in")]
    #[case("My App (x64)")]
    #[case("[ab]?* {a,b} ~user #comment !bang")]
    #[case("quote\"d and 'single'")]
    #[case("`touch pwned` and \\backslashes\\")]
    #[case("ünïcödé name")]
    #[case("line\nbreak\ttab")]
    fn test_posix_escape_is_one_word_for_sh(#[case] raw: &str) {
        let cwd = tempfile::tempdir().unwrap();
        let escaped = escape_arg(raw, HostPlatform::Unix);

        let (count, word) = sh_words(&escaped, cwd.path());

        assert_eq!(count, "1");
        assert_eq!(word, raw);
        assert!(!cwd.path().join("pwned").exists());
    }

    #[rstest]
    #[case("C:\\Program Files\\App", "\"C:\\Program Files\\App\"")]
    #[case("C:\\My Dir\\", "\"C:\\My Dir\\\\\"")]
    #[case("say \"hi\"", "\"say \\\"hi\\\"\"")]
    #[case("a b c", "\"a b c\"")]
    fn test_windows_quoting(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(escape_arg(raw, HostPlatform::Windows), expected);
    }
}
