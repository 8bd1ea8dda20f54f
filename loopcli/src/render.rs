//! Colored, width-aware text output for built loops.
use std::io::{self, Write};

use loopcore::{Loop, Parity};
use termcolor::{Color, ColorSpec, WriteColor};

/// Styles used to annotate parts of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Label,
    Equation,
    Even,
    Odd,
}

impl Style {
    fn to_color_spec(self) -> ColorSpec {
        let mut s = ColorSpec::new();
        match self {
            Style::Label => {
                s.set_dimmed(true);
            }
            Style::Equation => {
                s.set_fg(Some(Color::Green)).set_bold(true);
            }
            Style::Even => {
                s.set_fg(Some(Color::Yellow));
            }
            Style::Odd => {
                s.set_fg(Some(Color::Cyan)).set_bold(true);
            }
        }
        s
    }
}

impl From<Parity> for Style {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::Even => Style::Even,
            Parity::Odd => Style::Odd,
        }
    }
}

/// Retrieve the width of the terminal, if stdout is one.
pub fn terminal_width() -> Option<usize> {
    term_size::dimensions().map(|(w, _)| w)
}

/// Splits `text` into lines of at most `width` characters.
pub fn wrap(text: &str, width: Option<usize>) -> Vec<&str> {
    let Some(width) = width.filter(|&w| w > 0) else {
        return vec![text];
    };

    let mut lines = Vec::new();
    let mut rest = text;
    while rest.chars().count() > width {
        let cut = rest
            .char_indices()
            .nth(width)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (line, tail) = rest.split_at(cut);
        lines.push(line);
        rest = tail;
    }
    lines.push(rest);
    lines
}

fn write_styled<W: WriteColor>(out: &mut W, style: Style, text: &str) -> io::Result<()> {
    out.set_color(&style.to_color_spec())?;
    write!(out, "{text}")?;
    out.reset()
}

fn write_wrapped<W: WriteColor>(
    out: &mut W,
    style: Style,
    text: &str,
    width: Option<usize>,
) -> io::Result<()> {
    for line in wrap(text, width) {
        write_styled(out, style, line)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Writes the rule, the starting number and, if `show_sequence`, every element of the
/// loop colored by parity.
pub fn write_loop<W: WriteColor>(
    out: &mut W,
    lp: &Loop,
    width: Option<usize>,
    show_sequence: bool,
) -> io::Result<()> {
    write_styled(out, Style::Label, "odd:   ")?;
    write_styled(out, Style::Equation, &lp.equation().to_string())?;
    writeln!(out)?;
    write_styled(out, Style::Label, "even:  ")?;
    write_styled(out, Style::Equation, "x / 2")?;
    writeln!(out)?;

    write_styled(out, Style::Label, "start:")?;
    writeln!(out)?;
    write_wrapped(out, Style::Odd, &lp.numerator().to_string(), width)?;

    if show_sequence {
        let odd = lp.elements().filter(|(_, parity)| parity.is_odd()).count();
        let total = lp.sequence().len();
        write_styled(
            out,
            Style::Label,
            &format!(
                "sequence: {} values ({} odd, {} even)",
                total,
                odd,
                total - odd
            ),
        )?;
        writeln!(out)?;
        for (value, parity) in lp.elements() {
            write_wrapped(out, parity.into(), &value.to_string(), width)?;
        }
    }
    Ok(())
}
