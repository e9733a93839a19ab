use crate::ir::Expression;

/// Check whether `expr` reads the storage named by `name`.
///
/// `name` is a variable name or a dotted field path (`hdr.ipv4`). A path or
/// member chain in `expr` overlaps it when one is a prefix of the other, so
/// writing `hdr.ipv4` affects both `hdr` and `hdr.ipv4.ttl`, but not
/// `hdr.ethernet`.
pub fn expr_uses(expr: &Expression, name: &str) -> bool {
    let target: Vec<&str> = name.split('.').collect();
    uses(expr, &target)
}

fn uses(expr: &Expression, target: &[&str]) -> bool {
    match expr.lvalue_components() {
        Some(components) => overlaps(&components, target),
        None => expr
            .children()
            .into_iter()
            .any(|child| uses(child, target)),
    }
}

fn overlaps(a: &[&str], b: &[&str]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x == y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::builder::*;

    #[test]
    fn test_plain_variable_use() {
        let expr = add(path("x"), constant(1));
        assert!(expr_uses(&expr, "x"));
        assert!(!expr_uses(&expr, "y"));
        assert!(!expr_uses(&constant(3), "x"));
    }

    #[test]
    fn test_use_inside_call_arguments() {
        let expr = call(path("f"), vec![], vec![index(path("arr"), path("i"))]);
        assert!(expr_uses(&expr, "i"));
        assert!(expr_uses(&expr, "arr"));
        assert!(expr_uses(&expr, "f"));
    }

    #[test]
    fn test_field_paths_overlap_by_prefix() {
        let ttl = member(member(path("hdr"), "ipv4"), "ttl");
        assert!(expr_uses(&ttl, "hdr"));
        assert!(expr_uses(&ttl, "hdr.ipv4"));
        assert!(!expr_uses(&ttl, "hdr.ethernet"));
        assert!(expr_uses(&path("hdr"), "hdr.ipv4"));
    }

    #[test]
    fn test_prefix_of_name_is_not_a_use() {
        assert!(!expr_uses(&path("xy"), "x"));
    }
}
