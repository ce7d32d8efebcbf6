//! Gettext catalog reader for `.po` and `.pot` files
//!
//! Only what the pipeline needs: `msgid`, the singular `msgstr`, `msgctxt`
//! `#:` source references and `#,` flags. Plural forms beyond `msgstr[0]` and
//! obsolete `#~` entries are skipped. Fuzzy entries are kept as terms but never
//! used as translations.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{EmlError, Result};

/// One catalog entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoEntry {
    pub msgctxt: Option<String>,
    pub msgid: String,
    pub msgstr: String,
    /// `(file, line)` pairs from `#:` comments
    pub occurrences: Vec<(String, String)>,
    /// Flags from `#,` comments, e.g. `fuzzy`, `python-format`
    pub flags: Vec<String>,
}

impl PoEntry {
    /// Occurrences rendered as `"{file} {line}"`, one per line
    pub fn context(&self) -> String {
        self.occurrences
            .iter()
            .map(|(file, line)| format!("{} {}", file, line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_fuzzy(&self) -> bool {
        self.flags.iter().any(|flag| flag == "fuzzy")
    }

    fn is_header(&self) -> bool {
        self.msgid.is_empty()
    }
}

/// A parsed catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<PoEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    None,
    Ctxt,
    Id,
    IdPlural,
    Str,
    Ignored,
}

#[derive(Default)]
struct PendingEntry {
    entry: PoEntry,
    has_msgid: bool,
    has_msgstr: bool,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| match e {
            EmlError::Translation(msg) => EmlError::Translation(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Load a catalog, treating a missing file as empty
    pub fn load_or_empty(path: &Path) -> Result<Self> {
        if !path.is_file() {
            log::warn!("No translation catalog at {}, using empty catalog", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut entries = Vec::new();
        let mut pending = PendingEntry::default();
        let mut field = Field::None;

        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        for (index, raw) in content.lines().enumerate() {
            let lineno = index + 1;
            let line = raw.trim();

            if line.is_empty() {
                flush(&mut pending, &mut entries);
                field = Field::None;
                continue;
            }
            if line.starts_with("#~") {
                continue;
            }
            if let Some(refs) = line.strip_prefix("#:") {
                if pending.has_msgstr {
                    flush(&mut pending, &mut entries);
                }
                pending.entry.occurrences.extend(refs.split_whitespace().map(parse_occurrence));
                field = Field::None;
                continue;
            }
            if let Some(flags) = line.strip_prefix("#,") {
                if pending.has_msgstr {
                    flush(&mut pending, &mut entries);
                }
                pending.entry.flags.extend(
                    flags
                        .split(',')
                        .map(str::trim)
                        .filter(|flag| !flag.is_empty())
                        .map(String::from),
                );
                field = Field::None;
                continue;
            }
            if line.starts_with('#') {
                if pending.has_msgstr {
                    flush(&mut pending, &mut entries);
                }
                field = Field::None;
                continue;
            }
            if line.starts_with('"') {
                let text = unquote(line).map_err(|e| parse_error(lineno, &e))?;
                match field {
                    Field::Ctxt => pending.entry.msgctxt.get_or_insert_with(String::new).push_str(&text),
                    Field::Id => pending.entry.msgid.push_str(&text),
                    Field::Str => pending.entry.msgstr.push_str(&text),
                    Field::IdPlural | Field::Ignored => {}
                    Field::None => return Err(parse_error(lineno, "string continuation outside of a field")),
                }
                continue;
            }

            let (keyword, rest) = line
                .split_once(char::is_whitespace)
                .ok_or_else(|| parse_error(lineno, "expected keyword and quoted string"))?;
            let text = unquote(rest.trim()).map_err(|e| parse_error(lineno, &e))?;

            match keyword {
                "msgctxt" => {
                    if pending.has_msgstr {
                        flush(&mut pending, &mut entries);
                    }
                    pending.entry.msgctxt = Some(text);
                    field = Field::Ctxt;
                }
                "msgid" => {
                    if pending.has_msgstr {
                        flush(&mut pending, &mut entries);
                    }
                    pending.entry.msgid = text;
                    pending.has_msgid = true;
                    field = Field::Id;
                }
                "msgid_plural" => field = Field::IdPlural,
                "msgstr" | "msgstr[0]" => {
                    pending.entry.msgstr = text;
                    pending.has_msgstr = true;
                    field = Field::Str;
                }
                k if k.starts_with("msgstr[") => field = Field::Ignored,
                other => return Err(parse_error(lineno, &format!("unknown keyword '{}'", other))),
            }
        }
        flush(&mut pending, &mut entries);

        Ok(Self { entries })
    }

    /// All entries except the header
    pub fn entries(&self) -> impl Iterator<Item = &PoEntry> {
        self.entries.iter().filter(|e| !e.is_header())
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Translation for `msgid`, if present, non-empty and not fuzzy
    pub fn gettext(&self, msgid: &str) -> Option<&str> {
        self.usable().find(|e| e.msgid == msgid).map(|e| e.msgstr.as_str())
    }

    /// Context-free translations keyed by msgid
    pub fn translations(&self) -> HashMap<String, String> {
        self.usable().map(|e| (e.msgid.clone(), e.msgstr.clone())).collect()
    }

    fn usable(&self) -> impl Iterator<Item = &PoEntry> {
        self.entries()
            .filter(|e| e.msgctxt.is_none() && !e.msgstr.is_empty() && !e.is_fuzzy())
    }
}

fn flush(pending: &mut PendingEntry, entries: &mut Vec<PoEntry>) {
    let done = std::mem::take(pending);
    if done.has_msgid {
        entries.push(done.entry);
    } else {
        // Comments without a msgid carry over to the next entry.
        pending.entry.occurrences = done.entry.occurrences;
        pending.entry.flags = done.entry.flags;
    }
}

fn parse_occurrence(reference: &str) -> (String, String) {
    match reference.rsplit_once(':') {
        Some((file, line)) if !line.is_empty() && line.chars().all(|c| c.is_ascii_digit()) => {
            (file.to_string(), line.to_string())
        }
        _ => (reference.to_string(), String::new()),
    }
}

fn unquote(s: &str) -> std::result::Result<String, String> {
    let inner = s
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| format!("expected quoted string, got {}", s))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => return Err("dangling escape".to_string()),
        }
    }
    Ok(out)
}

fn parse_error(lineno: usize, msg: &str) -> EmlError {
    EmlError::Translation(format!("line {}: {}", lineno, msg))
}
