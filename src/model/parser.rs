//! Line grammar for the feature-model document.
//!
//! The document has three top-level sections, each introduced by an
//! unindented keyword line:
//!
//! ```text
//! imports
//!     base_component
//! features
//!     app
//!         mandatory
//!             base_component.WebApplication
//! constraints
//!     ...            (opaque, preserved verbatim)
//! ```
//!
//! Indentation is structural: four spaces (or one tab) per nesting
//! level. Under `features`, even depths hold feature names and odd
//! depths hold cardinality group keywords. The `constraints` section is
//! not part of the integration grammar and round-trips untouched.

use super::{Cardinality, Feature, FeatureModel, Group};
use crate::constants::{CONSTRAINTS_KEYWORD, FEATURES_KEYWORD, IMPORTS_KEYWORD, INDENT_WIDTH};
use crate::core::SplmError;

/// Parse a feature-model document.
pub fn parse(content: &str, origin: &str) -> Result<FeatureModel, SplmError> {
    #[derive(PartialEq)]
    enum Section {
        Preamble,
        Imports,
        Features,
    }

    let mut section = Section::Preamble;
    let mut imports = Vec::new();
    let mut feature_lines: Vec<(usize, usize, String)> = Vec::new();
    let mut trailing: Vec<String> = Vec::new();

    let mut lines = content.lines().enumerate();
    while let Some((index, raw)) = lines.next() {
        let line_no = index + 1;
        let line = raw.trim_end();
        if line.trim().is_empty() {
            continue;
        }

        let depth = indent_depth(line, line_no, origin)?;
        let text = line.trim_start();

        if depth == 0 {
            match text {
                IMPORTS_KEYWORD => {
                    section = Section::Imports;
                    continue;
                }
                FEATURES_KEYWORD => {
                    section = Section::Features;
                    continue;
                }
                CONSTRAINTS_KEYWORD => {
                    // Opaque tail: keep the header and everything after it.
                    trailing.push(line.to_string());
                    trailing.extend(lines.by_ref().map(|(_, l)| l.trim_end().to_string()));
                    break;
                }
                other => {
                    return Err(SplmError::ModelParse {
                        path: origin.to_string(),
                        line: line_no,
                        reason: format!("expected a section keyword, found '{other}'"),
                    });
                }
            }
        }

        match section {
            Section::Preamble => {
                return Err(SplmError::ModelParse {
                    path: origin.to_string(),
                    line: line_no,
                    reason: "indented line before any section keyword".to_string(),
                });
            }
            Section::Imports => imports.push(text.to_string()),
            Section::Features => feature_lines.push((line_no, depth, text.to_string())),
        }
    }

    let mut pos = 0;
    let features = build_features(&feature_lines, &mut pos, 1, origin)?;

    Ok(FeatureModel { imports, features, trailing })
}

/// Render a feature model back to its canonical text form.
pub fn render(model: &FeatureModel) -> String {
    let mut out = String::new();

    out.push_str(IMPORTS_KEYWORD);
    out.push('\n');
    for import in &model.imports {
        indent(&mut out, 1);
        out.push_str(import);
        out.push('\n');
    }

    out.push_str(FEATURES_KEYWORD);
    out.push('\n');
    for feature in &model.features {
        render_feature(&mut out, feature, 1);
    }

    for line in &model.trailing {
        out.push_str(line);
        out.push('\n');
    }

    out
}

fn render_feature(out: &mut String, feature: &Feature, depth: usize) {
    indent(out, depth);
    out.push_str(&feature.name);
    out.push('\n');
    for group in &feature.groups {
        indent(out, depth + 1);
        out.push_str(group.cardinality.keyword());
        out.push('\n');
        for child in &group.children {
            render_feature(out, child, depth + 2);
        }
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth * INDENT_WIDTH {
        out.push(' ');
    }
}

/// Structural nesting depth of a line: one level per tab, or per
/// [`INDENT_WIDTH`] spaces.
fn indent_depth(line: &str, line_no: usize, origin: &str) -> Result<usize, SplmError> {
    let ws: &str = &line[..line.len() - line.trim_start().len()];

    if ws.contains('\t') {
        if ws.chars().any(|c| c != '\t') {
            return Err(SplmError::ModelParse {
                path: origin.to_string(),
                line: line_no,
                reason: "mixed tabs and spaces in indentation".to_string(),
            });
        }
        return Ok(ws.len());
    }

    if ws.len() % INDENT_WIDTH != 0 {
        return Err(SplmError::ModelParse {
            path: origin.to_string(),
            line: line_no,
            reason: format!("indentation is not a multiple of {INDENT_WIDTH} spaces"),
        });
    }
    Ok(ws.len() / INDENT_WIDTH)
}

fn build_features(
    lines: &[(usize, usize, String)],
    pos: &mut usize,
    depth: usize,
    origin: &str,
) -> Result<Vec<Feature>, SplmError> {
    let mut features = Vec::new();

    while *pos < lines.len() {
        let (line_no, line_depth, text) = &lines[*pos];
        if *line_depth < depth {
            break;
        }
        if *line_depth > depth {
            return Err(SplmError::ModelParse {
                path: origin.to_string(),
                line: *line_no,
                reason: "unexpected indentation jump".to_string(),
            });
        }
        if Cardinality::from_keyword(text).is_some() {
            return Err(SplmError::ModelParse {
                path: origin.to_string(),
                line: *line_no,
                reason: format!("group keyword '{text}' where a feature name was expected"),
            });
        }

        let name = text.clone();
        *pos += 1;

        let mut groups = Vec::new();
        while *pos < lines.len() && lines[*pos].1 == depth + 1 {
            let (group_line, _, group_text) = &lines[*pos];
            let cardinality = Cardinality::from_keyword(group_text).ok_or_else(|| {
                SplmError::ModelParse {
                    path: origin.to_string(),
                    line: *group_line,
                    reason: format!("expected a group keyword, found '{group_text}'"),
                }
            })?;
            *pos += 1;
            let children = build_features(lines, pos, depth + 2, origin)?;
            groups.push(Group { cardinality, children });
        }

        features.push(Feature { name, groups });
    }

    Ok(features)
}
