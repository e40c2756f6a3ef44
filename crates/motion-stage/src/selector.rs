//! Minimal selector matching: `*`, `tag`, `#id`, `.class`, compounds such as
//! `div.item` and comma-separated lists.

/// One compound selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub universal: bool,
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl Compound {
    pub fn matches(&self, id: &str, tag: &str, classes: &[String]) -> bool {
        self.tag.as_deref().is_none_or(|t| t.eq_ignore_ascii_case(tag))
            && self.id.as_deref().is_none_or(|i| i == id)
            && self.classes.iter().all(|c| classes.contains(c))
    }
}

/// Parse a selector list. Returns `None` when any part is malformed.
pub fn parse(selector: &str) -> Option<Vec<Compound>> {
    selector.split(',').map(|part| parse_compound(part.trim())).collect()
}

fn parse_compound(text: &str) -> Option<Compound> {
    if text.is_empty() || text.contains(char::is_whitespace) {
        return None;
    }

    let mut compound = Compound::default();
    let mut rest = text;
    if let Some(after) = rest.strip_prefix('*') {
        compound.universal = true;
        rest = after;
    } else {
        let end = rest.find(['#', '.']).unwrap_or(rest.len());
        if end > 0 {
            compound.tag = Some(valid_name(&rest[..end])?.to_string());
        }
        rest = &rest[end..];
    }

    while !rest.is_empty() {
        let marker = rest.chars().next()?;
        let body = &rest[1..];
        let end = body.find(['#', '.']).unwrap_or(body.len());
        let name = valid_name(&body[..end])?.to_string();
        match marker {
            '#' if compound.id.is_none() => compound.id = Some(name),
            '.' => compound.classes.push(name),
            _ => return None,
        }
        rest = &body[end..];
    }
    Some(compound)
}

fn valid_name(name: &str) -> Option<&str> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    ok.then_some(name)
}
