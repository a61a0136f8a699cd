use node_bridge::{BuilderMode, Handle, HandleTable, Node, Session};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Scalar(i64),
    Temp(bool, u8),
    Free,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<i64>().prop_map(Op::Scalar),
        4 => (any::<bool>(), any::<u8>()).prop_map(|(obj, n)| Op::Temp(obj, n)),
        1 => Just(Op::Free),
    ]
}

proptest! {
    #[test]
    fn handles_are_unique_and_increasing(ops in prop::collection::vec(op(), 1..64)) {
        let mut table = HandleTable::new();
        let mut last = Handle::NULL;
        for op in ops {
            let h = match op {
                Op::Scalar(v) => table.register_final(Node::Int(v)),
                Op::Temp(true, n) => table.register_temp(BuilderMode::Object, n as usize),
                Op::Temp(false, n) => table.register_temp(BuilderMode::Array, n as usize),
                Op::Free => {
                    table.free();
                    continue;
                }
            };
            prop_assert!(h > last, "{h:?} after {last:?}");
            last = h;
        }
    }

    #[test]
    fn int_roundtrip(v in any::<i64>()) {
        let mut s = Session::new();
        let h = s.new_int(v);
        prop_assert_eq!(s.as_int(h), v);
    }

    #[test]
    fn uint_roundtrip(v in any::<u64>()) {
        let mut s = Session::new();
        let h = s.new_uint(v);
        prop_assert_eq!(s.as_uint(h), v);
    }

    #[test]
    fn float_roundtrip_is_bit_exact(bits in any::<u64>()) {
        let v = f64::from_bits(bits);
        let mut s = Session::new();
        let h = s.new_float(v);
        prop_assert_eq!(s.as_float(h).to_bits(), bits);
    }

    #[test]
    fn string_roundtrip(v in ".*") {
        let mut s = Session::new();
        let h = s.new_string(&v);
        prop_assert_eq!(s.as_string(h), Some(v.as_str()));
    }

    #[test]
    fn array_children_roundtrip(values in prop::collection::vec(any::<i64>(), 0..32)) {
        let mut s = Session::new();
        let arr = s.new_array(values.len());
        for (i, v) in values.iter().enumerate() {
            let h = s.new_int(*v);
            s.set_value(arr, i, h);
        }
        let built = s.build(arr);
        prop_assert_eq!(s.size(built), values.len());
        for (i, v) in values.iter().enumerate() {
            let child = s.value_at(built, i);
            prop_assert_eq!(s.as_int(child), *v);
        }
        prop_assert!(s.last_error().is_none());
    }

    #[test]
    fn object_keys_enumerate_sorted_and_unique(keys in prop::collection::vec("[a-z]{0,6}", 0..16)) {
        let mut s = Session::new();
        let obj = s.new_object(keys.len());
        for key in &keys {
            let v = s.new_string(key);
            s.set_key_value(obj, key, v);
        }
        let built = s.build(obj);

        let mut expected = keys.clone();
        expected.sort();
        expected.dedup();
        prop_assert_eq!(s.size(built), expected.len());
        for (i, key) in expected.iter().enumerate() {
            prop_assert_eq!(s.key_at(built, i), Some(key.as_str()));
            let v = s.value_at(built, i);
            prop_assert_eq!(s.as_string(v), Some(key.as_str()));
        }
    }
}
