use std::path::Path;
use std::{env, io};

mod chess960 {
    use std::io::{self, BufWriter, Write};
    use std::{fs, path::Path};

    use kibitz_base::types::FigureType;

    /// Knight placements on the five squares left after placing bishops and queen
    const KNIGHTS: [(usize, usize); 10] = [
        (0, 1),
        (0, 2),
        (0, 3),
        (0, 4),
        (1, 2),
        (1, 3),
        (1, 4),
        (2, 3),
        (2, 4),
        (3, 4),
    ];

    fn nth_empty(row: &[Option<FigureType>; 8], n: usize) -> usize {
        row.iter()
            .enumerate()
            .filter(|(_, f)| f.is_none())
            .nth(n)
            .map(|(i, _)| i)
            .expect("not enough empty squares")
    }

    /// Builds the base row for the start position with Scharnagl number `index`
    fn base_row(index: usize) -> [FigureType; 8] {
        let mut row = [None; 8];
        let (n, light) = (index / 4, index % 4);
        row[2 * light + 1] = Some(FigureType::Bishop);
        let (n, dark) = (n / 4, n % 4);
        row[2 * dark] = Some(FigureType::Bishop);
        let (n, queen) = (n / 6, n % 6);
        let pos = nth_empty(&row, queen);
        row[pos] = Some(FigureType::Queen);
        let (first, second) = KNIGHTS[n];
        let (first, second) = (nth_empty(&row, first), nth_empty(&row, second));
        row[first] = Some(FigureType::Knight);
        row[second] = Some(FigureType::Knight);
        for kind in [FigureType::Rook, FigureType::King, FigureType::Rook] {
            let pos = nth_empty(&row, 0);
            row[pos] = Some(kind);
        }
        row.map(|f| f.expect("row is filled"))
    }

    pub fn gen(out_path: &Path) -> io::Result<()> {
        let f = fs::File::create(out_path)?;
        let mut w = BufWriter::new(&f);
        writeln!(w, "static CHESS960_ROWS: [[FigureType; 8]; 960] = [")?;
        for index in 0..960 {
            let row = base_row(index)
                .map(|t| format!("FigureType::{:?}", t))
                .join(", ");
            writeln!(w, "    /*{:3}*/ [{}],", index, row)?;
        }
        writeln!(w, "];")?;
        Ok(())
    }
}

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = env::var("OUT_DIR").unwrap();

    chess960::gen(&Path::new(&out_dir).join("chess960.rs"))?;

    Ok(())
}
