//! Marker regions - Sentinel-delimited spans that regeneration may rewrite
//!
//! ```ts
//!   // storyteller:auto:core:start
//!   id: "chapter01",
//!   // storyteller:auto:core:end
//! ```
//!
//! Everything outside a start/end pair belongs to the author. Locating is
//! strict: each region needs exactly one start and one end line at the same
//! indentation, and regions may not overlap. Anything else is reported as a
//! reason string and the caller refuses to touch the file.

use std::sync::OnceLock;

use regex::Regex;

/// Generated regions, in the order they appear in a fresh module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Imports,
    Core,
    Entities,
    References,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::Imports,
        Region::Core,
        Region::Entities,
        Region::References,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Region::Imports => "imports",
            Region::Core => "core",
            Region::Entities => "entities",
            Region::References => "references",
        }
    }

    pub fn start_marker(&self) -> String {
        format!("// storyteller:auto:{}:start", self.name())
    }

    pub fn end_marker(&self) -> String {
        format!("// storyteller:auto:{}:end", self.name())
    }

    fn from_name(name: &str) -> Option<Self> {
        Region::ALL.into_iter().find(|region| region.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Start,
    End,
}

#[derive(Debug)]
struct MarkerLine {
    line: usize,
    indent: String,
    region: Region,
    boundary: Boundary,
}

/// Located region: sentinel line indices, both inclusive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSpan {
    pub region: Region,
    pub indent: String,
    pub start_line: usize,
    pub end_line: usize,
}

fn marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([ \t]*)// storyteller:auto:(imports|core|entities|references):(start|end)\s*$")
            .expect("marker pattern is valid")
    })
}

/// Wrap rendered region lines in sentinels, re-indented to `indent`
pub fn wrap_region(region: Region, indent: &str, body: &[String]) -> Vec<String> {
    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.push(format!("{indent}{}", region.start_marker()));
    lines.extend(body.iter().map(|line| {
        if line.is_empty() {
            String::new()
        } else {
            format!("{indent}{line}")
        }
    }));
    lines.push(format!("{indent}{}", region.end_marker()));
    lines
}

/// Find all four regions in `text`, ordered by position
pub fn locate_regions(text: &str) -> Result<Vec<RegionSpan>, String> {
    let markers: Vec<MarkerLine> = text
        .split('\n')
        .enumerate()
        .filter_map(|(line, content)| {
            let content = content.strip_suffix('\r').unwrap_or(content);
            let captures = marker_pattern().captures(content)?;
            let region = Region::from_name(captures.get(2)?.as_str())?;
            let boundary = match captures.get(3)?.as_str() {
                "start" => Boundary::Start,
                _ => Boundary::End,
            };
            Some(MarkerLine {
                line,
                indent: captures.get(1)?.as_str().to_string(),
                region,
                boundary,
            })
        })
        .collect();

    let mut spans = Vec::with_capacity(Region::ALL.len());
    for region in Region::ALL {
        spans.push(locate_region(region, &markers)?);
    }
    spans.sort_by_key(|span| span.start_line);

    for pair in spans.windows(2) {
        if pair[1].start_line < pair[0].end_line {
            return Err(format!(
                "regions `{}` and `{}` overlap",
                pair[0].region.name(),
                pair[1].region.name()
            ));
        }
    }
    Ok(spans)
}

fn locate_region(region: Region, markers: &[MarkerLine]) -> Result<RegionSpan, String> {
    let of = |boundary| {
        markers
            .iter()
            .filter(move |m| m.region == region && m.boundary == boundary)
            .collect::<Vec<_>>()
    };
    let starts = of(Boundary::Start);
    let ends = of(Boundary::End);

    let start = match starts.as_slice() {
        [] => return Err(format!("missing `{}` start marker", region.name())),
        [start] => *start,
        _ => return Err(format!("duplicate `{}` start markers", region.name())),
    };
    let end = match ends.as_slice() {
        [] => return Err(format!("missing `{}` end marker", region.name())),
        [end] => *end,
        _ => return Err(format!("duplicate `{}` end markers", region.name())),
    };

    if end.line < start.line {
        return Err(format!("`{}` end marker precedes its start", region.name()));
    }
    if end.indent != start.indent {
        return Err(format!(
            "`{}` end marker is not indented like its start",
            region.name()
        ));
    }

    Ok(RegionSpan {
        region,
        indent: start.indent.clone(),
        start_line: start.line,
        end_line: end.line,
    })
}

/// Replace every region (sentinels included) with freshly rendered lines.
/// Text outside the regions is copied through byte for byte.
pub fn splice_regions<F>(text: &str, mut render: F) -> Result<String, String>
where
    F: FnMut(Region) -> Vec<String>,
{
    let spans = locate_regions(text)?;
    let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
    let lines: Vec<&str> = text.split('\n').collect();

    let mut out = String::with_capacity(text.len());
    let mut next = 0;
    for span in &spans {
        for line in &lines[next..span.start_line] {
            out.push_str(line);
            out.push('\n');
        }

        let rendered = wrap_region(span.region, &span.indent, &render(span.region));
        for line in &rendered {
            out.push_str(line);
            out.push_str(newline);
        }
        next = span.end_line + 1;
    }

    if next < lines.len() {
        let rest = lines[next..].join("\n");
        out.push_str(&rest);
    } else {
        // The last region closed the file without a trailing newline
        out.truncate(out.len() - newline.len());
    }
    Ok(out)
}
