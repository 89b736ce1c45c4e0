//! Turkish-aware string ordering for category lists.
//!
//! Letters follow the Turkish alphabet (`c < ç < d`, `g < ğ < h`, `ı < i`,
//! `o < ö < p`, `s < ş < t`, `u < ü < v`), case is ignored, and runs of
//! digits compare by numeric value (`"Kategori 2" < "Kategori 10"`).

use std::cmp::Ordering;

const ALPHABET: &str = "abcçdefgğhıijklmnoöpqrsştuüvwxyz";

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Key {
    Symbol(char),
    /// Digit run with leading zeros stripped, ordered by length then text.
    Number(usize, String),
    Letter(usize),
    Other(char),
}

fn fold_case(c: char) -> char {
    match c {
        'I' => 'ı',
        'İ' => 'i',
        'â' | 'Â' => 'a',
        'î' | 'Î' => 'i',
        'û' | 'Û' => 'u',
        'é' | 'É' | 'è' | 'È' | 'ê' | 'Ê' => 'e',
        _ => c.to_lowercase().next().unwrap_or(c),
    }
}

fn sort_keys(s: &str) -> Vec<Key> {
    let mut keys = Vec::new();
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            let mut digits = String::from(c);
            while let Some(&next) = chars.peek() {
                if !next.is_ascii_digit() {
                    break;
                }
                digits.push(next);
                chars.next();
            }
            let trimmed = digits.trim_start_matches('0');
            keys.push(Key::Number(trimmed.len(), trimmed.to_string()));
            continue;
        }

        let folded = fold_case(c);
        if let Some(rank) = ALPHABET.chars().position(|a| a == folded) {
            keys.push(Key::Letter(rank));
        } else if folded.is_alphabetic() {
            keys.push(Key::Other(folded));
        } else {
            keys.push(Key::Symbol(folded));
        }
    }
    keys
}

/// Compares two strings in Turkish collation order.
///
/// Strings that are equal under collation (differing only in case, say) fall
/// back to a plain comparison so the order is total.
#[must_use]
pub fn turkish_cmp(a: &str, b: &str) -> Ordering {
    sort_keys(a).cmp(&sort_keys(b)).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(input: &[&str]) -> Vec<String> {
        let mut v: Vec<String> = input.iter().map(ToString::to_string).collect();
        v.sort_by(|a, b| turkish_cmp(a, b));
        v
    }

    #[test]
    fn turkish_letters_sort_after_their_base() {
        assert_eq!(
            sorted(&["Çanta", "Dizüstü", "Cihaz"]),
            vec!["Cihaz", "Çanta", "Dizüstü"]
        );
        assert_eq!(
            sorted(&["Şarj", "Tablet", "Sunucu"]),
            vec!["Sunucu", "Şarj", "Tablet"]
        );
        assert_eq!(sorted(&["Üretim", "Vida", "Usb"]), vec!["Usb", "Üretim", "Vida"]);
    }

    #[test]
    fn dotless_i_sorts_before_dotted_i() {
        assert_eq!(sorted(&["İnce", "Isı"]), vec!["Isı", "İnce"]);
    }

    #[test]
    fn case_is_ignored() {
        assert_eq!(sorted(&["monitör", "Anakart", "kasa"]), vec!["Anakart", "kasa", "monitör"]);
    }

    #[test]
    fn digit_runs_compare_numerically() {
        assert_eq!(
            sorted(&["Diğer (10)", "Diğer (9)", "Diğer (06)"]),
            vec!["Diğer (06)", "Diğer (9)", "Diğer (10)"]
        );
    }

    #[test]
    fn turkish_ordering_is_not_byte_ordering() {
        // In UTF-8 byte order "Ç" (0xC3 0x87) sorts after every ASCII letter.
        assert_eq!(turkish_cmp("Çevre Birimleri", "Depolama"), Ordering::Less);
        assert_eq!("Çevre Birimleri".cmp("Depolama"), Ordering::Greater);
    }

    #[test]
    fn order_is_total_for_case_variants() {
        assert_ne!(turkish_cmp("ssd", "SSD"), Ordering::Equal);
        assert_eq!(turkish_cmp("SSD", "SSD"), Ordering::Equal);
    }
}
