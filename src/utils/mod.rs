use std::cmp::Ordering;

use uuid::Uuid;

/// Derive a stable MAC address from a device name.
///
/// A name-based UUID (v5) gives a stable digest of the name; the first six
/// bytes become the MAC with the locally-administered bit set and the
/// multicast bit cleared. Regenerating a plan therefore never changes a
/// switch's MAC, with no counter to persist.
pub fn derive_mac(name: &str) -> String {
    let digest = Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes());
    let bytes = &digest.as_bytes()[..6];
    let mut octets: Vec<String> = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    octets[0] = format!("{:02x}", (bytes[0] | 0x02) & 0xfe);
    octets.join(":")
}

/// Compare two names treating digit runs as numbers, so "enp2" sorts before
/// "enp10". Ties on numeric value fall back to byte order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let ab = a.as_bytes();
    let bb = b.as_bytes();
    let mut i = 0;
    let mut j = 0;

    while i < ab.len() && j < bb.len() {
        if ab[i].is_ascii_digit() && bb[j].is_ascii_digit() {
            let si = i;
            while i < ab.len() && ab[i].is_ascii_digit() {
                i += 1;
            }
            let sj = j;
            while j < bb.len() && bb[j].is_ascii_digit() {
                j += 1;
            }
            let na = a[si..i].trim_start_matches('0');
            let nb = b[sj..j].trim_start_matches('0');
            let ord = na.len().cmp(&nb.len()).then_with(|| na.cmp(nb));
            if ord != Ordering::Equal {
                return ord;
            }
        } else {
            let ord = ab[i].cmp(&bb[j]);
            if ord != Ordering::Equal {
                return ord;
            }
            i += 1;
            j += 1;
        }
    }

    (ab.len() - i).cmp(&(bb.len() - j))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_mac_is_stable() {
        let a = derive_mac("leaf-01");
        let b = derive_mac("leaf-01");
        assert_eq!(a, b);
        assert_ne!(a, derive_mac("leaf-02"));
    }

    #[test]
    fn test_derive_mac_format_and_bits() {
        let mac = derive_mac("spine-01");
        let octets: Vec<&str> = mac.split(':').collect();
        assert_eq!(octets.len(), 6);
        let first = u8::from_str_radix(octets[0], 16).unwrap();
        assert_eq!(first & 0x02, 0x02, "locally-administered bit must be set");
        assert_eq!(first & 0x01, 0x00, "multicast bit must be cleared");
    }

    #[test]
    fn test_natural_cmp_orders_numerically() {
        let mut names = vec!["enp10s0", "enp2s0", "enp1s0"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["enp1s0", "enp2s0", "enp10s0"]);
    }

    #[test]
    fn test_natural_cmp_plain_strings() {
        assert_eq!(natural_cmp("abc", "abd"), Ordering::Less);
        assert_eq!(natural_cmp("abc", "abc"), Ordering::Equal);
        assert_eq!(natural_cmp("abcd", "abc"), Ordering::Greater);
        assert_eq!(natural_cmp("eth2", "eth02"), Ordering::Greater);
    }
}
