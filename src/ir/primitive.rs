//! Operand classification for target primitive operations
//!
//! Primitive operations come from P4-14 style actions. Most of them write
//! their first operand; a few read it as well. Unknown primitives are assumed
//! to only read their operands.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// How an operand position or an lvalue slot is accessed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Access {
    #[default]
    Read,
    Write,
    ReadWrite,
}

impl Access {
    pub fn is_read(self) -> bool {
        matches!(self, Access::Read | Access::ReadWrite)
    }

    pub fn is_write(self) -> bool {
        matches!(self, Access::Write | Access::ReadWrite)
    }
}

#[derive(Debug, Clone, Copy)]
struct PrimitiveInfo {
    /// Bit `i` set: operand `i` is written
    writes: u32,
    /// Bit `i` set: operand `i` is also read before being written
    updates: u32,
}

impl PrimitiveInfo {
    const fn writes(mask: u32) -> Self {
        PrimitiveInfo {
            writes: mask,
            updates: 0,
        }
    }

    const fn updates(mask: u32) -> Self {
        PrimitiveInfo {
            writes: mask,
            updates: mask,
        }
    }

    const fn none() -> Self {
        PrimitiveInfo {
            writes: 0,
            updates: 0,
        }
    }
}

static PRIMITIVES: Lazy<HashMap<&'static str, PrimitiveInfo>> = Lazy::new(|| {
    HashMap::from([
        ("modify_field", PrimitiveInfo::writes(0b1)),
        ("modify_field_with_hash_based_offset", PrimitiveInfo::writes(0b1)),
        ("modify_field_rng_uniform", PrimitiveInfo::writes(0b1)),
        ("modify_field_conditionally", PrimitiveInfo::writes(0b1)),
        ("add", PrimitiveInfo::writes(0b1)),
        ("subtract", PrimitiveInfo::writes(0b1)),
        ("bit_and", PrimitiveInfo::writes(0b1)),
        ("bit_or", PrimitiveInfo::writes(0b1)),
        ("bit_xor", PrimitiveInfo::writes(0b1)),
        ("shift_left", PrimitiveInfo::writes(0b1)),
        ("shift_right", PrimitiveInfo::writes(0b1)),
        ("copy_header", PrimitiveInfo::writes(0b1)),
        ("register_read", PrimitiveInfo::writes(0b1)),
        ("execute_meter", PrimitiveInfo::writes(0b100)),
        ("add_to_field", PrimitiveInfo::updates(0b1)),
        ("subtract_from_field", PrimitiveInfo::updates(0b1)),
        ("add_header", PrimitiveInfo::updates(0b1)),
        ("remove_header", PrimitiveInfo::updates(0b1)),
        ("push", PrimitiveInfo::updates(0b1)),
        ("pop", PrimitiveInfo::updates(0b1)),
        ("register_write", PrimitiveInfo::none()),
        ("count", PrimitiveInfo::none()),
        ("drop", PrimitiveInfo::none()),
        ("no_op", PrimitiveInfo::none()),
        ("truncate", PrimitiveInfo::none()),
        ("generate_digest", PrimitiveInfo::none()),
        ("resubmit", PrimitiveInfo::none()),
        ("recirculate", PrimitiveInfo::none()),
        ("clone_ingress_pkt_to_egress", PrimitiveInfo::none()),
        ("clone_egress_pkt_to_egress", PrimitiveInfo::none()),
    ])
});

/// Access of operand `index` of the primitive called `name`
pub fn operand_access(name: &str, index: usize) -> Access {
    let Some(info) = PRIMITIVES.get(name) else {
        return Access::Read;
    };
    if index >= 32 {
        return Access::Read;
    }
    let bit = 1u32 << index;
    if info.updates & bit != 0 {
        Access::ReadWrite
    } else if info.writes & bit != 0 {
        Access::Write
    } else {
        Access::Read
    }
}
