//! Chapter module renderer
//!
//! Produces the TypeScript module for a [`ChapterMeta`]. Each marker region
//! is rendered on its own through [`render_region`] so a fresh module and a
//! spliced update share exactly the same text.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::application::dto::ChapterMeta;
use crate::domain::entities::EntityKind;
use crate::domain::value_objects::{DetectedEntity, Predicate, ValidationRule};
use crate::infrastructure::emitter::markers::{wrap_region, Region};

const CHAPTER_META_TYPE_IMPORT: &str = "@storyteller/types/chapter-meta.ts";
const INDENT: &str = "  ";

/// Render a complete module; `timestamp` only feeds the header comment
pub fn render_module(meta: &ChapterMeta, output_path: &Path, timestamp: DateTime<Utc>) -> String {
    let mut lines = vec![
        "// Auto-generated by storyteller meta generate".to_string(),
        format!("// Generated at: {}", timestamp.format("%Y-%m-%d %H:%M:%S UTC")),
        String::new(),
    ];

    let marked = |region: Region, indent: &str| {
        wrap_region(region, indent, &render_region(region, meta, output_path))
    };

    lines.extend(marked(Region::Imports, ""));
    lines.push(String::new());
    lines.push(format!(
        "export const {}: ChapterMeta = {{",
        meta_export_name(meta.id.as_str())
    ));
    lines.extend(marked(Region::Core, INDENT));
    lines.extend(marked(Region::Entities, INDENT));

    if let Some(summary) = &meta.summary {
        lines.push(format!("{INDENT}summary: {},", js_string(summary)));
    }
    if !meta.plot_points.is_empty() {
        lines.push(format!("{INDENT}plotPoints: ["));
        for point in &meta.plot_points {
            lines.push(format!("{INDENT}{INDENT}{},", js_string(point)));
        }
        lines.push(format!("{INDENT}],"));
    }
    if !meta.validations.is_empty() {
        lines.push(format!("{INDENT}validations: ["));
        for rule in &meta.validations {
            lines.extend(render_rule(rule).into_iter().map(|line| format!("{INDENT}{INDENT}{line}")));
        }
        lines.push(format!("{INDENT}],"));
    }

    lines.extend(marked(Region::References, INDENT));
    lines.push("};".to_string());

    let mut module = lines.join("\n");
    module.push('\n');
    module
}

/// Body of one marker region, without sentinels or base indentation
pub fn render_region(region: Region, meta: &ChapterMeta, output_path: &Path) -> Vec<String> {
    match region {
        Region::Imports => render_imports(meta, output_path),
        Region::Core => vec![
            format!("id: {},", js_string(meta.id.as_str())),
            format!("title: {},", js_string(&meta.title)),
            format!("order: {},", js_number(&meta.order)),
        ],
        Region::Entities => {
            let bindings = ImportBindings::new(meta);
            vec![
                format!("characters: [{}],", bindings.list(&meta.characters)),
                format!("settings: [{}],", bindings.list(&meta.settings)),
            ]
        }
        Region::References => {
            if meta.references.is_empty() {
                return vec!["references: {},".to_string()];
            }
            let bindings = ImportBindings::new(meta);
            let mut lines = vec!["references: {".to_string()];
            lines.extend(meta.references.iter().map(|(pattern, entity)| {
                let local = bindings.local(entity.kind, entity.id.as_str(), &entity.export_name);
                format!("{INDENT}{}: {},", js_string(pattern), local)
            }));
            lines.push("},".to_string());
            lines
        }
    }
}

fn render_imports(meta: &ChapterMeta, output_path: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "import type {{ ChapterMeta }} from {};",
        js_string(CHAPTER_META_TYPE_IMPORT)
    )];

    let from_dir = output_path.parent().unwrap_or(Path::new(""));
    for import in ImportBindings::new(meta).imports {
        let specifier = if import.local == import.export_name {
            import.local
        } else {
            format!("{} as {}", import.export_name, import.local)
        };
        lines.push(format!(
            "import {{ {specifier} }} from {};",
            js_string(&relative_import(from_dir, import.file_path))
        ));
    }
    lines
}

struct EntityImport<'a> {
    local: String,
    export_name: &'a str,
    file_path: &'a Path,
}

/// Identifier each detected entity is bound to inside the module
///
/// One import per `(kind, export name, file)`. When two different sources
/// export the same name, the later one is aliased with its kind as a suffix
/// (`tower as towerSetting`); characters are bound first.
struct ImportBindings<'a> {
    imports: Vec<EntityImport<'a>>,
    locals: HashMap<(EntityKind, &'a str), String>,
}

impl<'a> ImportBindings<'a> {
    fn new(meta: &'a ChapterMeta) -> Self {
        let mut imports: Vec<EntityImport<'a>> = Vec::new();
        let mut locals = HashMap::new();
        let mut by_source: HashMap<(EntityKind, &'a str, &'a Path), String> = HashMap::new();
        let mut taken: HashSet<String> = HashSet::new();

        for entity in sorted_by_export(&meta.characters)
            .into_iter()
            .chain(sorted_by_export(&meta.settings))
        {
            let source = (
                entity.kind,
                entity.export_name.as_str(),
                entity.file_path.as_path(),
            );
            let local = match by_source.get(&source) {
                Some(local) => local.clone(),
                None => {
                    let local = unique_local(entity, &taken);
                    taken.insert(local.clone());
                    by_source.insert(source, local.clone());
                    imports.push(EntityImport {
                        local: local.clone(),
                        export_name: &entity.export_name,
                        file_path: &entity.file_path,
                    });
                    local
                }
            };
            locals.insert((entity.kind, entity.id.as_str()), local);
        }

        Self { imports, locals }
    }

    fn local<'b>(&'b self, kind: EntityKind, id: &'b str, export_name: &'b str) -> &'b str {
        self.locals
            .get(&(kind, id))
            .map(String::as_str)
            .unwrap_or(export_name)
    }

    fn list(&self, entities: &[DetectedEntity]) -> String {
        entities
            .iter()
            .map(|entity| self.local(entity.kind, entity.id.as_str(), &entity.export_name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn unique_local(entity: &DetectedEntity, taken: &HashSet<String>) -> String {
    if !taken.contains(&entity.export_name) {
        return entity.export_name.clone();
    }
    let suffix = match entity.kind {
        EntityKind::Character => "Character",
        EntityKind::Setting => "Setting",
    };
    let base = format!("{}{suffix}", entity.export_name);
    let mut candidate = base.clone();
    let mut counter = 2;
    while taken.contains(&candidate) {
        candidate = format!("{base}{counter}");
        counter += 1;
    }
    candidate
}

fn sorted_by_export(entities: &[DetectedEntity]) -> Vec<&DetectedEntity> {
    let mut sorted: Vec<&DetectedEntity> = entities.iter().collect();
    sorted.sort_by(|a, b| a.export_name.cmp(&b.export_name));
    sorted
}

/// Integers and decimals print as written; YAML infinities become JS ones
fn js_number(number: &serde_yaml::Number) -> String {
    match number.as_f64() {
        Some(value) if value == f64::INFINITY => "Infinity".to_string(),
        Some(value) if value == f64::NEG_INFINITY => "-Infinity".to_string(),
        _ => number.to_string(),
    }
}

fn render_rule(rule: &ValidationRule) -> Vec<String> {
    let mut lines = vec![
        "{".to_string(),
        format!("{INDENT}type: {},", js_string(rule.rule_type.as_str())),
        format!("{INDENT}validate: {},", render_predicate(&rule.validate)),
    ];
    if let Some(message) = &rule.message {
        lines.push(format!("{INDENT}message: {},", js_string(message)));
    }
    lines.push("},".to_string());
    lines
}

/// Print a predicate as a TypeScript arrow function over the chapter text
pub fn render_predicate(predicate: &Predicate) -> String {
    match predicate {
        Predicate::ContainsAny { patterns } if patterns.is_empty() => {
            "(_content: string) => false".to_string()
        }
        Predicate::ContainsAny { patterns } => {
            let checks = patterns
                .iter()
                .map(|pattern| format!("content.includes({})", js_string(pattern)))
                .collect::<Vec<_>>()
                .join(" || ");
            format!("(content: string) => {checks}")
        }
        Predicate::Placeholder { todo } => {
            format!("(_content: string) => true /* TODO: {} */", todo.replace("*/", "* /"))
        }
    }
}

/// `chapter-01` -> `chapter01Meta`, `intro_part_two` -> `introPartTwoMeta`
pub fn meta_export_name(chapter_id: &str) -> String {
    let mut name = String::new();
    for (index, segment) in chapter_id
        .split(|c: char| !c.is_alphanumeric())
        .filter(|segment| !segment.is_empty())
        .enumerate()
    {
        if index == 0 {
            name.push_str(segment);
        } else {
            let mut chars = segment.chars();
            if let Some(first) = chars.next() {
                name.extend(first.to_uppercase());
                name.push_str(chars.as_str());
            }
        }
    }
    if name.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name.push_str("Meta");
    name
}

/// Import specifier for `target` as seen from `from_dir`: `./x.ts` or `../x.ts`
pub fn relative_import(from_dir: &Path, target: &Path) -> String {
    let from = normalize(from_dir);
    let target = normalize(target);
    let from: Vec<Component> = from.components().collect();
    let to: Vec<Component> = target.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = std::iter::repeat("..".to_string())
        .take(from.len() - common)
        .collect();
    parts.extend(
        to[common..]
            .iter()
            .map(|component| component.as_os_str().to_string_lossy().into_owned()),
    );

    let joined = parts.join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{joined}")
    }
}

/// Lexically drop `.` and fold `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value.escape_default()))
}
