use crate::config::{terminator_for, CanonicalSection, Config, Section, Terminator};

/// Encodes a configuration into the flat sectioned text format.
///
/// Flat configurations get `[Section]` headers. Split configurations get
/// `[Config:Section]` headers, one block per section of every
/// sub-configuration. Each block ends with a blank line.
pub fn encode(config: &Config) -> String {
    let mut out = String::new();
    match config {
        Config::Flat(sections) => {
            for (name, section) in sections.iter() {
                push_header(&mut out, None, name);
                let append_semicolon = name == CanonicalSection::ProjectFiles.name();
                push_section(&mut out, name, section, append_semicolon);
            }
        }
        Config::Split(configs) => {
            for (config_name, sections) in configs.iter() {
                for (name, section) in sections.iter() {
                    push_header(&mut out, Some(config_name), name);
                    push_section(&mut out, name, section, false);
                }
            }
        }
    }
    out
}

fn push_header(out: &mut String, config_name: Option<&str>, section_name: &str) {
    out.push('[');
    if let Some(config_name) = config_name {
        out.push_str(config_name);
        out.push(':');
    }
    out.push_str(section_name);
    out.push_str("]\n");
}

fn push_section(out: &mut String, name: &str, section: &Section, append_semicolon: bool) {
    let terminator = terminator_for(name);
    let last = section.len().saturating_sub(1);

    for (index, (key, values)) in section.iter().enumerate() {
        let terminate = match terminator {
            Terminator::Always => true,
            Terminator::WhenFlagged => append_semicolon && index == last,
            Terminator::Never => false,
        };

        out.push_str(key);
        out.push('=');
        out.push_str(&values.join(";"));
        if terminate {
            out.push(';');
        }
        out.push('\n');
    }
    out.push('\n');
}
