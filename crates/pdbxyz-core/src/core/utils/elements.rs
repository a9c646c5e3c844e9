use phf::{Set, phf_set};

static ELEMENT_SYMBOLS: Set<&'static str> = phf_set! {
    "H", "HE",
    "LI", "BE", "B", "C", "N", "O", "F", "NE",
    "NA", "MG", "AL", "SI", "P", "S", "CL", "AR",
    "K", "CA", "SC", "TI", "V", "CR", "MN", "FE", "CO", "NI", "CU", "ZN",
    "GA", "GE", "AS", "SE", "BR", "KR",
    "RB", "SR", "Y", "ZR", "NB", "MO", "TC", "RU", "RH", "PD", "AG", "CD",
    "IN", "SN", "SB", "TE", "I", "XE",
    "CS", "BA", "LA", "CE", "PR", "ND", "PM", "SM", "EU", "GD", "TB", "DY",
    "HO", "ER", "TM", "YB", "LU", "HF", "TA", "W", "RE", "OS", "IR", "PT",
    "AU", "HG", "TL", "PB", "BI", "PO", "AT", "RN",
    "FR", "RA", "AC", "TH", "PA", "U", "NP", "PU", "AM", "CM", "BK", "CF",
    "ES", "FM", "MD", "NO", "LR", "RF", "DB", "SG", "BH", "HS", "MT", "DS",
    "RG", "CN", "NH", "FL", "MC", "LV", "TS", "OG",
};

/// Normalizes an element symbol to canonical capitalization (e.g. "CL" -> "Cl").
///
/// Returns `None` if the trimmed input is not a known element.
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let upper = raw.trim().to_ascii_uppercase();
    if !ELEMENT_SYMBOLS.contains(upper.as_str()) {
        return None;
    }
    let mut chars = upper.chars();
    let first = chars.next()?;
    Some(
        std::iter::once(first)
            .chain(chars.map(|c| c.to_ascii_lowercase()))
            .collect(),
    )
}

/// Infers an element symbol from a raw PDB atom-name field (columns 13-16).
///
/// Follows the PDB alignment convention: a blank or numeric first column marks a
/// one-letter element in the second column, while names that start in the first
/// column may carry a two-letter element. Full-width names beginning with `H`
/// are hydrogens (e.g. "HG21").
pub fn infer_from_atom_name(raw_name: &str) -> Option<String> {
    let first = raw_name.chars().next()?;

    if first == ' ' || first.is_ascii_digit() {
        let letter = raw_name.chars().find(|c| c.is_ascii_alphabetic())?;
        return normalize_symbol(&letter.to_string());
    }

    let trimmed = raw_name.trim();
    if trimmed.len() == 4 && first.eq_ignore_ascii_case(&'H') {
        return normalize_symbol("H");
    }

    let letters: String = trimmed
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .take(2)
        .collect();
    if letters.len() == 2 {
        if let Some(symbol) = normalize_symbol(&letters) {
            return Some(symbol);
        }
    }
    normalize_symbol(&first.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_symbol_fixes_capitalization() {
        assert_eq!(normalize_symbol("CL").as_deref(), Some("Cl"));
        assert_eq!(normalize_symbol(" c").as_deref(), Some("C"));
        assert_eq!(normalize_symbol("fe").as_deref(), Some("Fe"));
    }

    #[test]
    fn normalize_symbol_rejects_unknown_symbols() {
        assert_eq!(normalize_symbol("XX"), None);
        assert_eq!(normalize_symbol(""), None);
    }

    #[test]
    fn infer_uses_second_column_for_right_aligned_names() {
        assert_eq!(infer_from_atom_name(" CA ").as_deref(), Some("C"));
        assert_eq!(infer_from_atom_name(" N  ").as_deref(), Some("N"));
        assert_eq!(infer_from_atom_name("1HB ").as_deref(), Some("H"));
    }

    #[test]
    fn infer_detects_two_letter_elements_in_first_column() {
        assert_eq!(infer_from_atom_name("CA  ").as_deref(), Some("Ca"));
        assert_eq!(infer_from_atom_name("CL1 ").as_deref(), Some("Cl"));
        assert_eq!(infer_from_atom_name("FE  ").as_deref(), Some("Fe"));
    }

    #[test]
    fn infer_treats_full_width_h_names_as_hydrogen() {
        assert_eq!(infer_from_atom_name("HG21").as_deref(), Some("H"));
        assert_eq!(infer_from_atom_name("HD11").as_deref(), Some("H"));
    }

    #[test]
    fn infer_falls_back_to_first_letter() {
        assert_eq!(infer_from_atom_name("OXT ").as_deref(), Some("O"));
        assert_eq!(infer_from_atom_name("C1  ").as_deref(), Some("C"));
    }

    #[test]
    fn infer_returns_none_for_blank_names() {
        assert_eq!(infer_from_atom_name("    "), None);
        assert_eq!(infer_from_atom_name(""), None);
    }
}
