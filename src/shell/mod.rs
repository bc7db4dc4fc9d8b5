//! Line-oriented query shell over a [`Catalog`].
//!
//! ```text
//! nearest NAME RADIUS
//! neighbors NAME RADIUS
//! path FROM TO RADIUS
//! reachable NAME RADIUS
//! connected RADIUS
//! trilaterate NAME DISTANCE [NAME DISTANCE]...
//! coordinates NAME
//! distance NAME NAME
//! ```
//!
//! Names containing spaces are quoted with `'` or `"`; an unquoted `#` starts
//! a comment.

mod tokenize;

use std::io::{self, BufRead, Write};

use log::debug;
use thiserror::Error;

use crate::catalog::Catalog;
use crate::error::Error;
use crate::Jump;

pub use tokenize::{strip_comment, tokenize};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),
    #[error(transparent)]
    Core(#[from] Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

struct Args<'a> {
    tokens: &'a [String],
}

impl<'a> Args<'a> {
    fn text(&self, idx: usize, what: &'static str) -> Result<&'a str, CommandError> {
        self.tokens
            .get(idx)
            .map(String::as_str)
            .ok_or(CommandError::MissingArgument(what))
    }

    fn number(&self, idx: usize, what: &'static str) -> Result<f64, CommandError> {
        let raw = self.text(idx, what)?;
        raw.parse()
            .map_err(|_| CommandError::InvalidNumber(raw.to_string()))
    }
}

pub struct Shell {
    catalog: Catalog,
}

impl Shell {
    pub fn new(catalog: Catalog) -> Self {
        Shell { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Runs one line. Blank and comment-only lines are accepted and do
    /// nothing; an unknown command is reported on `out`, not as an error.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> Result<(), CommandError> {
        let tokens = tokenize(strip_comment(line));
        let Some(command) = tokens.first() else {
            return Ok(());
        };
        let args = Args { tokens: &tokens };
        let catalog = &mut self.catalog;

        match command.as_str() {
            "nearest" => {
                let name = args.text(1, "star name")?;
                let radius = args.number(2, "radius")?;
                let from = catalog.get_star(name)?;
                match catalog.nearest_neighbor(name, radius)? {
                    Some(to) => writeln!(
                        out,
                        "Neighbor: {} Distance: {}",
                        to.name,
                        from.distance(to)
                    )?,
                    None => writeln!(out, "No neighbor within {radius}")?,
                }
            }
            "neighbors" => {
                let name = args.text(1, "star name")?;
                let radius = args.number(2, "radius")?;
                let from = catalog.get_star(name)?;
                for n in catalog.neighbors(name, radius)? {
                    writeln!(out, "Neighbor: {} Distance: {}", n.name, from.distance(&n))?;
                }
            }
            "path" => {
                let from = args.text(1, "origin")?;
                let to = args.text(2, "destination")?;
                let radius = args.number(3, "radius")?;
                let route = catalog.path(from, to, radius)?;
                let Some(first) = route.first() else {
                    writeln!(out, "No path found")?;
                    return Ok(());
                };
                writeln!(out, "{} 0", first.name)?;
                for pair in route.windows(2) {
                    let jump = Jump::new(pair[0].clone(), pair[1].clone());
                    writeln!(out, "{} {}", jump.target.name, jump.weight())?;
                }
            }
            "reachable" => {
                let name = args.text(1, "star name")?;
                let radius = args.number(2, "radius")?;
                for star in catalog.reachable(name, radius)? {
                    writeln!(out, "{}", star.name)?;
                }
            }
            "connected" => {
                let radius = args.number(1, "radius")?;
                for component in catalog.connected_components(radius)? {
                    writeln!(out, "Component:")?;
                    for star in component {
                        writeln!(out, "\t{}", star.name)?;
                    }
                }
            }
            "trilaterate" => {
                let mut samples = Vec::new();
                let mut idx = 1;
                while idx < tokens.len() {
                    let name = args.text(idx, "star name")?;
                    let distance = args.number(idx + 1, "distance")?;
                    samples.push((name, distance));
                    idx += 2;
                }
                let p = catalog.trilaterate(&samples)?;
                writeln!(out, "{}, {}, {}", p.x, p.y, p.z)?;
            }
            "coordinates" => {
                let p = catalog.get_star(args.text(1, "star name")?)?.coordinate;
                writeln!(out, "({}, {}, {})", p.x, p.y, p.z)?;
            }
            "distance" => {
                let a = catalog.get_star(args.text(1, "star name")?)?;
                let b = catalog.get_star(args.text(2, "star name")?)?;
                writeln!(out, "{}", a.distance(b))?;
            }
            other => writeln!(out, "Unknown command: {other}")?,
        }
        Ok(())
    }

    /// Executes every line of `input` until EOF. Command failures are
    /// printed as `Error: ...` and the loop carries on; only I/O failures on
    /// `input` or `out` end it early.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        out: &mut W,
        prompt: Option<&str>,
    ) -> io::Result<()> {
        let mut line = String::new();
        loop {
            if let Some(prompt) = prompt {
                write!(out, "{prompt}")?;
                out.flush()?;
            }
            line.clear();
            if input.read_line(&mut line)? == 0 {
                if prompt.is_some() {
                    writeln!(out)?;
                }
                return Ok(());
            }

            match self.execute(&line, out) {
                Ok(()) => {}
                Err(CommandError::Io(e)) => return Err(e),
                Err(e) => {
                    debug!("command {:?} failed: {e}", line.trim_end());
                    writeln!(out, "Error: {e}")?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Star;
    use std::io::Cursor;

    fn shell() -> Shell {
        Shell::new(Catalog::from_stars([
            Star::new("Sol", [0.0, 0.0, 0.0]),
            Star::new("Alpha", [4.0, 0.0, 0.0]),
            Star::new("Polaris", [-5.0, 0.0, 0.0]),
            Star::new("Proxima Centauri", [0.0, 3.0, 0.0]),
        ]))
    }

    fn run(shell: &mut Shell, line: &str) -> String {
        let mut out = Vec::new();
        shell.execute(line, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn nearest_and_neighbors() {
        let mut sh = shell();
        assert_eq!(run(&mut sh, "nearest Sol 5"), "Neighbor: Proxima Centauri Distance: 3\n");
        assert_eq!(run(&mut sh, "nearest Sol 1"), "No neighbor within 1\n");
        assert_eq!(
            run(&mut sh, "neighbors Sol 4.5"),
            "Neighbor: Alpha Distance: 4\nNeighbor: Proxima Centauri Distance: 3\n"
        );
    }

    #[test]
    fn quoted_names_and_comments() {
        let mut sh = shell();
        assert_eq!(run(&mut sh, "coordinates 'Proxima Centauri' # where?"), "(0, 3, 0)\n");
        assert_eq!(run(&mut sh, "distance \"Proxima Centauri\" Alpha"), "5\n");
        assert_eq!(run(&mut sh, "   # nothing here"), "");
        assert_eq!(run(&mut sh, ""), "");
    }

    #[test]
    fn path_and_reachability() {
        let mut sh = shell();
        assert_eq!(run(&mut sh, "path Alpha Polaris 5"), "Alpha 0\nSol 4\nPolaris 5\n");
        assert_eq!(run(&mut sh, "path Alpha Polaris 1"), "No path found\n");
        assert_eq!(run(&mut sh, "reachable Polaris 3.5"), "Polaris\n");
        assert_eq!(
            run(&mut sh, "connected 4"),
            "Component:\n\tAlpha\n\tProxima Centauri\n\tSol\nComponent:\n\tPolaris\n"
        );
    }

    #[test]
    fn trilaterate_command() {
        let mut sh = Shell::new(Catalog::from_stars([
            Star::new("X", [0.0, 0.0, 0.0]),
            Star::new("Y", [10.0, 0.0, 0.0]),
            Star::new("Z", [0.0, 10.0, 0.0]),
            Star::new("W", [0.0, 0.0, 10.0]),
        ]));
        let truth = crate::Coordinate::new(3.0, 4.0, 0.0);
        let line = format!(
            "trilaterate X {} Y {} Z {} W {}",
            truth.distance(&crate::Coordinate::new(0.0, 0.0, 0.0)),
            truth.distance(&crate::Coordinate::new(10.0, 0.0, 0.0)),
            truth.distance(&crate::Coordinate::new(0.0, 10.0, 0.0)),
            truth.distance(&crate::Coordinate::new(0.0, 0.0, 10.0)),
        );
        let printed = run(&mut sh, &line);
        let parts: Vec<f64> = printed
            .trim()
            .split(", ")
            .map(|v| v.parse().unwrap())
            .collect();
        assert_eq!(parts.len(), 3);
        assert!(crate::Coordinate::new(parts[0], parts[1], parts[2]).distance(&truth) < 1e-9);
    }

    #[test]
    fn errors_are_reported() {
        let mut sh = shell();
        let mut out = Vec::new();
        assert!(matches!(
            sh.execute("nearest Vega 3", &mut out),
            Err(CommandError::Core(Error::NotFound(_)))
        ));
        assert!(matches!(
            sh.execute("nearest Sol", &mut out),
            Err(CommandError::MissingArgument("radius"))
        ));
        assert!(matches!(
            sh.execute("neighbors Sol far", &mut out),
            Err(CommandError::InvalidNumber(_))
        ));
        assert!(matches!(
            sh.execute("neighbors Sol -2", &mut out),
            Err(CommandError::Core(Error::Domain(_)))
        ));
        assert!(matches!(
            sh.execute("trilaterate Sol 1 Alpha 2", &mut out),
            Err(CommandError::Core(Error::TooFewSamples(2)))
        ));
        assert!(matches!(
            sh.execute("trilaterate Sol 1 Alpha", &mut out),
            Err(CommandError::MissingArgument("distance"))
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn run_continues_after_failures() {
        let mut sh = shell();
        let script = "warp Sol\nnearest Vega 1\ndistance Sol Alpha\n";
        let mut out = Vec::new();
        sh.run(Cursor::new(script), &mut out, None).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Unknown command: warp\nError: unknown star: Vega\n4\n"
        );
        assert_eq!(sh.catalog().len(), 4);
    }

    #[test]
    fn run_prints_prompt() {
        let mut sh = shell();
        let mut out = Vec::new();
        sh.run(Cursor::new("distance Sol Polaris\n"), &mut out, Some("> "))
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "> 5\n> \n");
    }
}
