/// Settings read from an agent file's front matter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonaMetadata {
    pub model: Option<String>,
    pub provider: Option<String>,
    pub connection: Option<String>,
    /// Context module identifiers in declaration order, blanks removed.
    pub context_modules: Vec<String>,
}

/// A parsed `agents/<name>.md` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentPersona {
    pub name: String,
    pub metadata: PersonaMetadata,
    /// Markdown body after the front matter.
    pub prompt: String,
}

/// Parses an agent persona file.
///
/// The front matter is a `---` delimited block of `key: value` lines. Unknown
/// keys are ignored; a file without front matter is all prompt.
pub fn parse_persona(name: &str, raw: &str) -> AgentPersona {
    let (front_matter, body) = split_front_matter(raw);
    let metadata = front_matter
        .map(parse_metadata)
        .unwrap_or_default();

    AgentPersona {
        name: name.to_string(),
        metadata,
        prompt: body.trim().to_string(),
    }
}

fn split_front_matter(raw: &str) -> (Option<&str>, &str) {
    let trimmed = raw.trim_start_matches('\u{feff}').trim_start();
    let Some(rest) = trimmed.strip_prefix("---") else {
        return (None, raw);
    };
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    if let Some(stripped) = rest.strip_prefix("---") {
        return (Some(""), stripped);
    }

    match rest.find("\n---") {
        Some(end) => {
            let after = &rest[end + 4..];
            let body = match after.find('\n') {
                Some(newline) => &after[newline + 1..],
                None => "",
            };
            (Some(&rest[..end]), body)
        }
        None => (None, raw),
    }
}

fn parse_metadata(block: &str) -> PersonaMetadata {
    let mut metadata = PersonaMetadata::default();

    for line in block.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = unquote(value.trim());

        match key.trim() {
            "model" => metadata.model = non_empty(value),
            "provider" => metadata.provider = non_empty(value),
            "connection" => metadata.connection = non_empty(value),
            "context_modules" => metadata.context_modules = split_module_list(&value),
            _ => {}
        }
    }

    metadata
}

fn split_module_list(value: &str) -> Vec<String> {
    let inner = value
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(value);
    inner
        .split(',')
        .map(|module| unquote(module.trim()))
        .filter(|module| !module.is_empty())
        .collect()
}

fn unquote(value: &str) -> String {
    let quoted = value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')));
    if quoted {
        value[1..value.len() - 1].to_string()
    } else {
        value.to_string()
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
