//! Terminal output for tokens, syntax trees, result hierarchies and query
//! diagnostics

use crate::assembler::Assembly;
use crate::error::BibqError;
use crate::profile::Profiles;
use crate::query::ast::{CqlQuery, Node};
use crate::query::render::render;
use crate::query::token::Token;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Colored stdout, or plain when `color` is false
pub fn stdout(color: bool) -> StandardStream {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

pub fn stderr(color: bool) -> StandardStream {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stderr(choice)
}

fn write_colored<W: WriteColor>(out: &mut W, color: Color, bold: bool, text: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold))?;
    write!(out, "{}", text)?;
    out.reset()
}

/// One token per line: offset, kind, surface text
pub fn print_tokens<W: WriteColor>(out: &mut W, tokens: &[Token]) -> io::Result<()> {
    for token in tokens {
        write_colored(out, Color::Green, false, &format!("{:>4}", token.offset))?;
        write!(out, "  ")?;
        write_colored(out, Color::Cyan, true, &format!("{:<10}", token.kind().to_string()))?;
        writeln!(out, "  {}", token.text())?;
    }
    Ok(())
}

/// Indented syntax tree
pub fn print_ast<W: WriteColor>(out: &mut W, query: &CqlQuery) -> io::Result<()> {
    print_node(out, &query.root, 0)?;
    if let Some(sort) = &query.sort {
        write_colored(out, Color::Magenta, true, "sortby")?;
        writeln!(out)?;
        for key in &sort.keys {
            write!(out, "  {}", key.index)?;
            for modifier in &key.modifiers {
                write!(out, "/{}", modifier)?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

fn print_node<W: WriteColor>(out: &mut W, node: &Node, depth: usize) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    match node {
        Node::Boolean {
            op,
            modifiers,
            left,
            right,
        } => {
            write!(out, "{}", indent)?;
            write_colored(out, Color::Magenta, true, &op.to_string().to_uppercase())?;
            for modifier in modifiers {
                write!(out, "/{}", modifier)?;
            }
            writeln!(out)?;
            print_node(out, left, depth + 1)?;
            print_node(out, right, depth + 1)
        }
        Node::Search(clause) => {
            write!(out, "{}", indent)?;
            match &clause.index {
                Some(index) => write_colored(out, Color::Blue, false, index)?,
                None => write_colored(out, Color::Blue, false, "(default)")?,
            }
            write!(out, " {}", clause.relation)?;
            for modifier in &clause.modifiers {
                write!(out, "/{}", modifier)?;
            }
            write!(out, " ")?;
            write_colored(out, Color::Yellow, false, &format!("{:?}", clause.term))?;
            writeln!(out, "  @{}", clause.offset)
        }
    }
}

/// Works of the page with their units and manifestations
pub fn print_assembly<W: WriteColor>(out: &mut W, start: usize, assembly: &Assembly) -> io::Result<()> {
    if assembly.works.is_empty() {
        writeln!(out, "no works")?;
    }

    for (i, work) in assembly.works.iter().enumerate() {
        write_colored(out, Color::Green, false, &format!("{:>3}. ", start + i))?;
        write_colored(out, Color::Magenta, true, work)?;
        writeln!(out)?;

        let units = assembly.hierarchy.units_for_work(work).unwrap_or_default();
        for unit in units {
            write!(out, "     ")?;
            write_colored(out, Color::Blue, false, unit)?;
            let manifestations = assembly
                .hierarchy
                .manifestations_for_unit(unit)
                .map(|set| set.iter().map(String::as_str).collect::<Vec<_>>().join(", "))
                .unwrap_or_default();
            writeln!(out, "  [{}]", manifestations)?;
        }
    }

    let stats = &assembly.stats;
    writeln!(
        out,
        "-- {} round trip(s), {} hit(s) seen, {} skipped, {} work(s) known",
        stats.round_trips,
        stats.hits_seen,
        stats.hits_skipped,
        assembly.hierarchy.work_count()
    )
}

/// Profile names with their compiled filters
pub fn print_profiles<W: WriteColor>(out: &mut W, profiles: &Profiles) -> io::Result<()> {
    if profiles.is_empty() {
        writeln!(out, "no profiles configured")?;
    }
    for name in profiles.names() {
        let Ok(profile) = profiles.get(name) else {
            continue;
        };
        write_colored(out, Color::Magenta, true, name)?;
        writeln!(out)?;
        writeln!(out, "  search:   {}", render(profile.search_filter()))?;
        writeln!(out, "  relation: {}", render(profile.relation_filter()))?;
        for (source, labels) in profile.relation_allow() {
            let labels: Vec<_> = labels.iter().map(String::as_str).collect();
            writeln!(out, "  {} -> {}", source, labels.join(", "))?;
        }
    }
    Ok(())
}

/// Error message, plus the query with a caret under the offending character
/// when the error carries an offset
pub fn print_diagnostic<W: WriteColor>(out: &mut W, input: &str, err: &BibqError) -> io::Result<()> {
    write_colored(out, Color::Red, true, "error")?;
    writeln!(out, "[{}]: {}", err.code(), err)?;

    if let Some(offset) = err.offset() {
        writeln!(out, "  {}", input)?;
        let pad: String = input
            .chars()
            .take(offset)
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        write!(out, "  {}", pad)?;
        write_colored(out, Color::Red, true, "^")?;
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Hit;
    use crate::query::parser::parse_cql;
    use crate::query::tokenizer::tokenize;
    use termcolor::Buffer;

    fn text(buffer: Buffer) -> String {
        String::from_utf8(buffer.into_inner()).unwrap()
    }

    #[test]
    fn test_caret_under_offset() {
        let input = "title = \"open";
        let err = tokenize(input).unwrap_err();
        let mut buffer = Buffer::no_color();
        print_diagnostic(&mut buffer, input, &err).unwrap();
        let out = text(buffer);
        let lines: Vec<_> = out.lines().collect();
        assert!(lines[0].starts_with("error[SCAN_ERROR]"));
        assert_eq!(lines[2], "          ^");
    }

    #[test]
    fn test_no_caret_without_offset() {
        let mut buffer = Buffer::no_color();
        print_diagnostic(&mut buffer, "x", &BibqError::Engine("down".into())).unwrap();
        assert_eq!(text(buffer).lines().count(), 1);
    }

    #[test]
    fn test_tokens_and_tree() {
        let mut buffer = Buffer::no_color();
        print_tokens(&mut buffer, &tokenize("a and b").unwrap()).unwrap();
        let out = text(buffer);
        assert_eq!(out.lines().count(), 4);
        assert!(out.contains("and"));

        let mut buffer = Buffer::no_color();
        print_ast(&mut buffer, &parse_cql("title=a or b sortby year").unwrap()).unwrap();
        let out = text(buffer);
        assert!(out.starts_with("OR\n  title = \"a\"  @0\n  (default) = \"b\""));
        assert!(out.contains("sortby\n  year"));
    }

    #[test]
    fn test_assembly_tree() {
        let mut assembly = Assembly::default();
        assembly.hierarchy.insert(&Hit::new("W1", "U1", "M2"));
        assembly.hierarchy.insert(&Hit::new("W1", "U1", "M1"));
        assembly.works = vec!["W1".to_string()];

        let mut buffer = Buffer::no_color();
        print_assembly(&mut buffer, 1, &assembly).unwrap();
        let out = text(buffer);
        assert!(out.contains("  1. W1"));
        assert!(out.contains("U1  [M1, M2]"));
    }
}
