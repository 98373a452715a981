//! A1-notation addressing for the values API.

/// Convert a 0-based column ordinal to letters: 0=A, 25=Z, 26=AA, 701=ZZ.
pub fn column_letter(ordinal: usize) -> String {
    let mut letters = String::new();
    let mut n = ordinal;
    loop {
        letters.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters
}

/// A1 reference for a 0-based (row, column ordinal) pair. Rows are 1-based
/// in A1 notation.
pub fn cell_ref(row: usize, column_ordinal: usize) -> String {
    format!("{}{}", column_letter(column_ordinal), row + 1)
}
