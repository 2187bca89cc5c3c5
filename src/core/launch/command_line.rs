// ─── Command Line ───
// Windows command-line quoting (the `CommandLineToArgvW` convention) and
// its inverse.

use std::path::Path;

/// Quotes one argument so that `CommandLineToArgvW` yields it back unchanged.
///
/// Arguments without whitespace or quotes are returned as-is. Otherwise the
/// argument is wrapped in quotes, embedded quotes are backslash-escaped and
/// backslashes that precede a quote (or the closing quote) are doubled.
pub fn quote_arg(arg: &str) -> String {
    let needs_quotes =
        arg.is_empty() || arg.contains([' ', '\t', '\n', '\u{0b}', '"']);
    if !needs_quotes {
        return arg.to_string();
    }

    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    let mut backslashes = 0usize;
    for ch in arg.chars() {
        match ch {
            '\\' => backslashes += 1,
            '"' => {
                push_backslashes(&mut quoted, backslashes * 2 + 1);
                quoted.push('"');
                backslashes = 0;
            }
            _ => {
                push_backslashes(&mut quoted, backslashes);
                quoted.push(ch);
                backslashes = 0;
            }
        }
    }
    push_backslashes(&mut quoted, backslashes * 2);
    quoted.push('"');
    quoted
}

fn push_backslashes(out: &mut String, count: usize) {
    out.extend(std::iter::repeat_n('\\', count));
}

/// `<options> -jar <payload> <args...>`, without the interpreter itself.
///
/// `options` is already a command-line fragment and is copied verbatim.
pub fn build_command_line(options: &str, payload: &Path, args: &[String]) -> String {
    let mut parts = Vec::with_capacity(args.len() + 3);
    let options = options.trim();
    if !options.is_empty() {
        parts.push(options.to_string());
    }
    parts.push("-jar".to_string());
    parts.push(quote_arg(&payload.to_string_lossy()));
    parts.extend(args.iter().map(|arg| quote_arg(arg)));
    parts.join(" ")
}

/// Splits a command line into arguments following the same rules
/// `CommandLineToArgvW` applies to everything after the program name.
pub fn split_command_line(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut started = false;
    let mut in_quotes = false;
    let mut backslashes = 0usize;

    for ch in line.chars() {
        match ch {
            '\\' => {
                backslashes += 1;
                started = true;
            }
            '"' => {
                push_backslashes(&mut current, backslashes / 2);
                if backslashes % 2 == 1 {
                    current.push('"');
                } else {
                    in_quotes = !in_quotes;
                }
                backslashes = 0;
                started = true;
            }
            ' ' | '\t' | '\n' | '\u{0b}' if !in_quotes => {
                push_backslashes(&mut current, backslashes);
                backslashes = 0;
                if started {
                    args.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            _ => {
                push_backslashes(&mut current, backslashes);
                backslashes = 0;
                current.push(ch);
                started = true;
            }
        }
    }
    push_backslashes(&mut current, backslashes);
    if started {
        args.push(current);
    }
    args
}
