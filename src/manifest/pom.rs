use std::collections::HashMap;
use std::sync::OnceLock;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

use super::ParseOptions;
use crate::errors::{MalformedManifest, ManifestError, UnsupportedManifestShape};
use crate::models::{DependencyDeclaration, DependencyKey, ManifestSnapshot};

/// Which part of the manifest a `<dependency>` element was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    /// The direct `<project><dependencies>` list.
    Direct,
    /// Inside `<dependencyManagement>`.
    Management,
    /// Inside a `<plugin>` block.
    Plugin,
    /// Anywhere else (profiles, exclusions nested oddly); never counted.
    Other,
}

/// A `<dependency>` element as read off the wire, before validation.
#[derive(Debug, Default)]
struct RawDependency {
    group: Option<String>,
    artifact: Option<String>,
    version: Option<String>,
    scope: Option<String>,
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder regex"))
}

/// Parse manifest text into a canonical [`ManifestSnapshot`] using the
/// default section scope (direct dependencies only).
pub fn parse(text: &str) -> Result<ManifestSnapshot, ManifestError> {
    parse_with(text, ParseOptions::default())
}

/// Parse manifest text into a canonical [`ManifestSnapshot`].
///
/// Formatting, attribute order, and comments never affect the result: two
/// textual snapshots that differ only in whitespace parse to equal values.
/// Version placeholders (`${name}`) are resolved in a single pass against
/// the same file's `<properties>` section; unresolved placeholders are kept
/// verbatim as the version string. A missing `<version>` element becomes the
/// empty string (the version is managed elsewhere).
pub fn parse_with(text: &str, opts: ParseOptions) -> Result<ManifestSnapshot, ManifestError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    // Local names of all currently open elements, root first.
    let mut stack: Vec<String> = Vec::new();

    let mut properties: HashMap<String, String> = HashMap::new();
    let mut modules: Vec<String> = Vec::new();
    let mut raw_deps: Vec<(Section, RawDependency)> = Vec::new();

    let mut current: Option<(Section, RawDependency)> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();

                if name == "dependency" && current.is_none() {
                    current = Some((classify_section(&stack), RawDependency::default()));
                }
                stack.push(name);
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();
                stack.pop();

                if name == "dependency" {
                    if let Some(entry) = current.take() {
                        raw_deps.push(entry);
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = match e.unescape() {
                    Ok(t) => t.trim().to_string(),
                    Err(err) => return Err(MalformedManifest::Xml(err.to_string()).into()),
                };
                if text.is_empty() {
                    continue;
                }

                match stack.as_slice() {
                    // <project><properties><some.name>value</some.name>
                    [_, props, name] if props == "properties" => {
                        properties.insert(name.clone(), text);
                    }
                    // <project><modules><module>child</module>
                    [_, mods, module] if mods == "modules" && module == "module" => {
                        modules.push(text);
                    }
                    // Fields directly under the open <dependency>; exclusion
                    // blocks nest deeper and must not clobber these.
                    [.., parent, field] if parent == "dependency" => {
                        if let Some((_, ref mut dep)) = current {
                            match field.as_str() {
                                "groupId" => dep.group = Some(text),
                                "artifactId" => dep.artifact = Some(text),
                                "version" => dep.version = Some(text),
                                "scope" => dep.scope = Some(text),
                                _ => {}
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(MalformedManifest::Xml(e.to_string()).into()),
        }
        buf.clear();
    }

    if !modules.is_empty() {
        return Err(UnsupportedManifestShape::ModuleAggregation { modules }.into());
    }

    build_snapshot(raw_deps, &properties, opts)
}

/// Decide which section an opening `<dependency>` belongs to from the
/// elements enclosing it.
fn classify_section(stack: &[String]) -> Section {
    if stack.iter().any(|n| n == "plugin") {
        return Section::Plugin;
    }
    if stack.iter().any(|n| n == "dependencyManagement") {
        return Section::Management;
    }
    // Exactly <project><dependencies> is the direct list; profile or other
    // nesting does not count.
    match stack {
        [_, deps] if deps == "dependencies" => Section::Direct,
        _ => Section::Other,
    }
}

/// Validate raw declarations and assemble the canonical snapshot.
fn build_snapshot(
    raw_deps: Vec<(Section, RawDependency)>,
    properties: &HashMap<String, String>,
    opts: ParseOptions,
) -> Result<ManifestSnapshot, ManifestError> {
    let mut snapshot = ManifestSnapshot::new();

    for (index, (section, raw)) in raw_deps.into_iter().enumerate() {
        let counted = match section {
            Section::Direct => true,
            Section::Management => opts.include_management,
            Section::Plugin | Section::Other => false,
        };
        if !counted {
            continue;
        }

        let group = raw.group.ok_or(MalformedManifest::MissingField {
            index,
            field: "groupId",
        })?;
        let artifact = raw.artifact.ok_or(MalformedManifest::MissingField {
            index,
            field: "artifactId",
        })?;

        let version = raw
            .version
            .map(|v| resolve_placeholders(&v, properties))
            .unwrap_or_default();

        let decl = DependencyDeclaration {
            key: DependencyKey::new(group, artifact),
            version,
            scope: raw.scope,
        };

        if let Some(previous) = snapshot.insert(decl.clone()) {
            return Err(MalformedManifest::DuplicateKey {
                key: decl.key,
                first: previous.version,
                second: decl.version,
            }
            .into());
        }
    }

    Ok(snapshot)
}

/// Substitute `${name}` placeholders from the properties map, one pass.
/// Unknown placeholders are kept verbatim.
fn resolve_placeholders(version: &str, properties: &HashMap<String, String>) -> String {
    placeholder_re()
        .replace_all(version, |caps: &regex::Captures<'_>| {
            properties
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Render a snapshot back to canonical manifest text.
///
/// The output is normalized: declarations in key order, fixed indentation,
/// no comments. Parsing the result yields the same snapshot back, which is
/// what makes canonicalization testable.
pub fn serialize(snapshot: &ManifestSnapshot) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<project>\n");
    out.push_str("  <dependencies>\n");
    for decl in snapshot.iter() {
        out.push_str("    <dependency>\n");
        out.push_str(&format!(
            "      <groupId>{}</groupId>\n",
            escape(&decl.key.group)
        ));
        out.push_str(&format!(
            "      <artifactId>{}</artifactId>\n",
            escape(&decl.key.artifact)
        ));
        if !decl.version.is_empty() {
            out.push_str(&format!(
                "      <version>{}</version>\n",
                escape(&decl.version)
            ));
        }
        if let Some(scope) = &decl.scope {
            out.push_str(&format!("      <scope>{}</scope>\n", escape(scope)));
        }
        out.push_str("    </dependency>\n");
    }
    out.push_str("  </dependencies>\n</project>\n");
    out
}
