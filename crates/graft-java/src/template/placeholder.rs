//! Placeholder scanning.
//!
//! `#{}` and `#{name}` splice argument text; `#{any()}`, `#{any(T)}` and
//! `#{name:any(T)}` splice an argument subtree, optionally checked against
//! type `T`. A name used twice binds to the same argument.

/// What a placeholder accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SlotKind {
    Raw,
    Typed { expected: Option<String> },
}

/// One occurrence of a placeholder in the snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Placeholder {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) kind: SlotKind,
    /// Index of the argument this occurrence binds to.
    pub(crate) binding: usize,
}

/// The placeholders of a snippet plus the number of arguments they need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Placeholders {
    pub(crate) occurrences: Vec<Placeholder>,
    pub(crate) arity: usize,
}

/// Scans `code` for placeholders in left-to-right order.
pub(crate) fn scan(code: &str) -> Result<Placeholders, String> {
    let mut out = Placeholders::default();
    let mut names: Vec<(String, usize)> = Vec::new();
    let mut offset = 0;
    while let Some(found) = code.get(offset..).and_then(|rest| rest.find("#{")) {
        let start = offset + found;
        let body_start = start + 2;
        let close = code
            .get(body_start..)
            .and_then(|rest| rest.find('}'))
            .ok_or_else(|| format!("unterminated placeholder at byte {start}"))?;
        let end = body_start + close + 1;
        let body = code.get(body_start..body_start + close).unwrap_or_default().trim();
        let (name, parsed) = parse_body(body)?;

        let known = name
            .as_ref()
            .and_then(|name| names.iter().find(|(known, _)| known == name))
            .map(|&(_, index)| index);
        let binding = known.unwrap_or_else(|| {
            let index = out.arity;
            out.arity += 1;
            if let Some(label) = name {
                names.push((label, index));
            }
            index
        });
        // A reused name takes the kind of its first occurrence.
        let kind = out
            .occurrences
            .iter()
            .find(|p| p.binding == binding)
            .map_or(parsed, |first| first.kind.clone());
        out.occurrences.push(Placeholder {
            start,
            end,
            kind,
            binding,
        });
        offset = end;
    }
    Ok(out)
}

fn parse_body(body: &str) -> Result<(Option<String>, SlotKind), String> {
    if body.is_empty() {
        return Ok((None, SlotKind::Raw));
    }
    let (name, spec) = match body.split_once(':') {
        Some((name, spec)) => (Some(name.trim()), spec.trim()),
        None if body.starts_with("any(") => (None, body),
        None => (Some(body), ""),
    };
    if let Some(label) = name.filter(|label| !is_identifier(label)) {
        return Err(format!("invalid placeholder name `{label}`"));
    }
    let kind = if spec.is_empty() {
        SlotKind::Raw
    } else {
        let inner = spec
            .strip_prefix("any(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| format!("unsupported placeholder `{body}`"))?
            .trim();
        SlotKind::Typed {
            expected: (!inner.is_empty()).then(|| inner.to_owned()),
        }
    };
    Ok((name.map(str::to_owned), kind))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}
