//! Plain-text circuit drawing.
//!
//! Each qubit and classical bit is a row; instructions are packed
//! greedily into columns so that no two instructions in a column touch
//! the same row span. Rows are separated by link lines that carry the
//! vertical connectors of multi-row instructions.

use qmcp_ir::{
    Circuit, GateKind, Instruction, InstructionKind, ParameterExpression, StandardGate,
};

const QUBIT_WIRE: char = '─';
const CLBIT_WIRE: char = '═';

/// How one instruction occupies the rows of a column.
struct Placement {
    lo: usize,
    hi: usize,
    cells: Vec<(usize, String)>,
    /// Marks for rows inside the span that carry no cell: (qubit, clbit).
    crossing: Option<(&'static str, &'static str)>,
    link: char,
}

impl Placement {
    fn spanning(
        cells: Vec<(usize, String)>,
        crossing: Option<(&'static str, &'static str)>,
        link: char,
    ) -> Option<Self> {
        let lo = cells.iter().map(|(r, _)| *r).min()?;
        let hi = cells.iter().map(|(r, _)| *r).max()?;
        Some(Self {
            lo,
            hi,
            cells,
            crossing,
            link,
        })
    }
}

struct Column {
    cells: Vec<Option<String>>,
    links: Vec<Option<char>>,
}

impl Column {
    fn new(rows: usize) -> Self {
        Self {
            cells: vec![None; rows],
            links: vec![None; rows.saturating_sub(1)],
        }
    }

    fn width(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(1)
    }
}

fn angle_label(name: &str, params: &[&ParameterExpression]) -> String {
    let args: Vec<_> = params.iter().map(|p| p.format_rounded(2)).collect();
    format!("{name}({})", args.join(","))
}

fn standard_label(gate: &StandardGate) -> String {
    match gate {
        StandardGate::Sdg => "Sdg".into(),
        StandardGate::Tdg => "Tdg".into(),
        StandardGate::CP(_) => angle_label("P", &gate.parameters()),
        g if g.is_parameterized() => {
            angle_label(&g.name().to_ascii_uppercase(), &g.parameters())
        }
        g => g.name().to_ascii_uppercase(),
    }
}

fn placement(instruction: &Instruction, num_qubits: usize) -> Option<Placement> {
    let rows: Vec<usize> = instruction.qubits.iter().map(|q| q.index()).collect();
    match &instruction.kind {
        InstructionKind::Measure => {
            let qubit = *rows.first()?;
            let clbit = num_qubits + instruction.clbits.first()?.index();
            Placement::spanning(
                vec![(qubit, "M".into()), (clbit, "╩".into())],
                Some(("╫", "╬")),
                '║',
            )
        }
        InstructionKind::Barrier => Placement::spanning(
            rows.iter().map(|&r| (r, "░".to_string())).collect(),
            None,
            '░',
        ),
        InstructionKind::Gate(GateKind::Composite(gate)) => {
            let name = gate.name.to_ascii_uppercase();
            Placement::spanning(
                rows.iter().map(|&r| (r, name.clone())).collect(),
                Some(("┼", "╪")),
                '│',
            )
        }
        InstructionKind::Gate(GateKind::Standard(gate)) => {
            let cells = match (gate, rows.as_slice()) {
                (StandardGate::CX, &[c, t]) => vec![(c, "■".into()), (t, "X".into())],
                (StandardGate::CZ, &[a, b]) => vec![(a, "■".into()), (b, "■".into())],
                (StandardGate::Swap, &[a, b]) => vec![(a, "x".into()), (b, "x".into())],
                (StandardGate::CP(_), &[c, t]) => {
                    vec![(c, "■".into()), (t, standard_label(gate))]
                }
                _ => {
                    let label = standard_label(gate);
                    rows.iter().map(|&r| (r, label.clone())).collect()
                }
            };
            Placement::spanning(cells, Some(("┼", "╪")), '│')
        }
    }
}

fn centered(symbol: &str, width: usize, fill: char) -> String {
    let pad = width.saturating_sub(symbol.chars().count());
    let left = pad / 2;
    let mut out = String::with_capacity(width * 3);
    out.extend(std::iter::repeat_n(fill, left));
    out.push_str(symbol);
    out.extend(std::iter::repeat_n(fill, pad - left));
    out
}

fn pack(circuit: &Circuit) -> Vec<Column> {
    let num_qubits = circuit.num_qubits();
    let rows = num_qubits + circuit.num_clbits();
    let mut columns: Vec<Column> = Vec::new();
    let mut level = vec![0usize; rows];

    for instruction in circuit.instructions() {
        let Some(p) = placement(instruction, num_qubits) else {
            continue;
        };
        if p.hi >= rows {
            continue;
        }
        let index = level[p.lo..=p.hi].iter().copied().max().unwrap_or(0);
        if index == columns.len() {
            columns.push(Column::new(rows));
        }
        let column = &mut columns[index];

        if let Some((on_qubit, on_clbit)) = p.crossing {
            for row in p.lo..=p.hi {
                let mark = if row < num_qubits { on_qubit } else { on_clbit };
                column.cells[row] = Some(mark.to_string());
            }
        }
        for (row, symbol) in p.cells {
            column.cells[row] = Some(symbol);
        }
        for gap in p.lo..p.hi {
            column.links[gap] = Some(p.link);
        }
        for slot in &mut level[p.lo..=p.hi] {
            *slot = index + 1;
        }
    }
    columns
}

/// Draw `circuit` with `q_i` rows for qubits and `c_i` rows for classical
/// bits. A circuit without instructions draws its bare wires.
pub fn to_text(circuit: &Circuit) -> String {
    let num_qubits = circuit.num_qubits();
    let rows = num_qubits + circuit.num_clbits();
    let labels: Vec<String> = (0..rows)
        .map(|r| {
            if r < num_qubits {
                format!("q_{r}")
            } else {
                format!("c_{}", r - num_qubits)
            }
        })
        .collect();
    let label_width = labels.iter().map(String::len).max().unwrap_or(0);

    let columns = pack(circuit);
    let widths: Vec<usize> = columns.iter().map(Column::width).collect();

    let mut lines = Vec::with_capacity(rows * 2);
    for (row, label) in labels.iter().enumerate() {
        let fill = if row < num_qubits { QUBIT_WIRE } else { CLBIT_WIRE };
        let mut line = format!("{label:>label_width$}: ");
        for (column, &width) in columns.iter().zip(&widths) {
            line.push(fill);
            match &column.cells[row] {
                Some(symbol) => line.push_str(&centered(symbol, width, fill)),
                None => line.extend(std::iter::repeat_n(fill, width)),
            }
            line.push(fill);
        }
        line.push(fill);
        lines.push(line);

        if row + 1 < rows {
            let mut link = " ".repeat(label_width + 2);
            for (column, &width) in columns.iter().zip(&widths) {
                let mark = column.links[row].map(String::from).unwrap_or_default();
                link.push(' ');
                link.push_str(&centered(&mark, width, ' '));
                link.push(' ');
            }
            lines.push(link.trim_end().to_string());
        }
    }
    lines.join("\n")
}
