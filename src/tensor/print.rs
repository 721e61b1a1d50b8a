use crate::tensor::Tensor;
use std::fmt;

impl Tensor {
    pub fn print(&self) {
        println!("{self}");
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, row) in self.data.rows().into_iter().enumerate() {
            if i != 0 {
                write!(f, ",\n ")?;
            }
            write!(f, "[")?;
            for (j, v) in row.iter().enumerate() {
                if j != 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{v:8.4}")?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")?;
        writeln!(f, "\n形状: {:?}", self.shape())
    }
}
