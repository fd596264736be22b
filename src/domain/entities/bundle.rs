use std::collections::HashMap;

/// Immutable set of message templates for one language
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageBundle {
    pub code: String,
    messages: HashMap<String, String>,
}

impl LanguageBundle {
    /// Build a bundle from ordered records; a later duplicate key wins
    pub fn from_records<I, K, V>(code: impl Into<String>, records: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            code: code.into(),
            messages: records.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Fill positional placeholders in a message template.
///
/// Supported: `%s` and `%d` take the next argument, `%N$s` takes the N-th
/// (1-based), `%%` is a literal percent and `%n` a newline. Every placeholder
/// needs an argument and every argument must be used; otherwise the reason is
/// returned as the error.
pub fn format_template(template: &str, args: &[&str]) -> Result<String, String> {
    let mut out = String::with_capacity(template.len());
    let mut used = vec![false; args.len()];
    let mut next = 0;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let index = match chars.next() {
            Some('%') => {
                out.push('%');
                continue;
            }
            Some('n') => {
                out.push('\n');
                continue;
            }
            Some('s') | Some('d') => {
                next += 1;
                next - 1
            }
            Some(d) if d.is_ascii_digit() => {
                let mut digits = String::from(d);
                while let Some(&d) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    digits.push(d);
                    chars.next();
                }
                if chars.next() != Some('$') || !matches!(chars.next(), Some('s') | Some('d')) {
                    return Err(format!("malformed indexed placeholder %{}", digits));
                }
                match digits.parse::<usize>() {
                    Ok(n) if n >= 1 => n - 1,
                    _ => return Err(format!("invalid placeholder index {}", digits)),
                }
            }
            Some(other) => return Err(format!("unsupported placeholder %{}", other)),
            None => return Err("dangling % at end of template".to_string()),
        };

        let Some(arg) = args.get(index) else {
            return Err(format!("placeholder {} has no argument ({} given)", index + 1, args.len()));
        };
        used[index] = true;
        out.push_str(arg);
    }

    let unused = used.iter().filter(|u| !**u).count();
    if unused > 0 {
        return Err(format!("{} of {} arguments not used", unused, args.len()));
    }
    Ok(out)
}
