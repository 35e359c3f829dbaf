//! CPLEX LP export, for handing the model to an external solver.

use std::fmt::Write as _;
use std::io::{self, Write};

use super::{LinearExpr, RoutingModel, VarKind};

const TERMS_PER_LINE: usize = 8;

impl RoutingModel {
    /// Writes the model in CPLEX LP format.
    ///
    /// Binary variables are listed under `Binaries`; continuous variables
    /// get explicit bounds. Constraints without terms are constant and are
    /// not written.
    pub fn write_lp<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "\\ fuel tanker routing")?;
        writeln!(out, "Minimize")?;
        writeln!(out, " obj: {}", self.format_expr(self.objective()))?;

        writeln!(out, "Subject To")?;
        for c in self.constraints() {
            if c.expr().is_empty() {
                continue;
            }
            writeln!(
                out,
                " {}: {} {} {}",
                c.name(),
                self.format_expr(c.expr()),
                c.sense().symbol(),
                c.rhs()
            )?;
        }

        writeln!(out, "Bounds")?;
        for var in self.layout().ids() {
            if self.kind(var) == VarKind::Continuous {
                let b = self.bounds(var);
                writeln!(out, " {} <= {} <= {}", b.lower, self.var_name(var), b.upper)?;
            }
        }

        writeln!(out, "Binaries")?;
        for var in self.layout().ids() {
            if self.kind(var) == VarKind::Binary {
                writeln!(out, " {}", self.var_name(var))?;
            }
        }
        writeln!(out, "End")
    }

    /// The LP export as a string.
    pub fn to_lp_string(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_lp(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn format_expr(&self, expr: &LinearExpr) -> String {
        let mut s = String::new();
        for (n, &(var, coef)) in expr.terms().iter().enumerate() {
            if n > 0 && n % TERMS_PER_LINE == 0 {
                s.push_str("\n   ");
            }
            let sign = if coef < 0.0 { '-' } else { '+' };
            if n == 0 {
                if coef < 0.0 {
                    s.push_str("- ");
                }
            } else {
                let _ = write!(s, " {sign} ");
            }
            let magnitude = coef.abs();
            if magnitude == 1.0 {
                s.push_str(&self.var_name(var));
            } else {
                let _ = write!(s, "{} {}", magnitude, self.var_name(var));
            }
        }
        if s.is_empty() {
            s.push('0');
        }
        s
    }
}
