#[cfg(test)]
mod tests {
    use crate::Value;
    use std::cmp::Ordering;

    #[test]
    fn test_int_basics() {
        let v = Value::int(123);
        assert!(v.is_int());
        assert!(!v.is_float());
        assert_eq!(v.as_i32(), 123);
        assert_eq!(v.as_f64(), 123.0);
    }

    #[test]
    fn test_float_truncates_toward_zero() {
        assert_eq!(Value::float(2.9).as_i32(), 2);
        assert_eq!(Value::float(-2.9).as_i32(), -2);
    }

    #[test]
    fn test_int_arithmetic_stays_int() {
        let r = Value::int(7).add(Value::int(5));
        assert_eq!(r, Value::Int(12));
        assert_eq!(Value::int(7).sub(Value::int(9)), Value::Int(-2));
        assert_eq!(Value::int(7).mul(Value::int(3)), Value::Int(21));
    }

    #[test]
    fn test_int_arithmetic_wraps() {
        assert_eq!(Value::int(i32::MAX).add(Value::int(1)), Value::Int(i32::MIN));
    }

    #[test]
    fn test_mixed_arithmetic_promotes() {
        let r = Value::int(1).add(Value::float(0.5));
        assert_eq!(r, Value::Float(1.5));
        let r = Value::float(3.0).mul(Value::int(2));
        assert_eq!(r, Value::Float(6.0));
    }

    #[test]
    fn test_integer_division_truncates() {
        assert_eq!(Value::int(7).checked_div(Value::int(2)), Some(Value::Int(3)));
        assert_eq!(Value::int(-7).checked_div(Value::int(2)), Some(Value::Int(-3)));
        assert_eq!(Value::int(-7).checked_rem(Value::int(2)), Some(Value::Int(-1)));
    }

    #[test]
    fn test_integer_division_by_zero() {
        assert_eq!(Value::int(1).checked_div(Value::int(0)), None);
        assert_eq!(Value::int(1).checked_rem(Value::int(0)), None);
    }

    #[test]
    fn test_float_division_by_zero_is_infinite() {
        let r = Value::float(1.0).checked_div(Value::int(0)).unwrap();
        assert!(r.as_f64().is_infinite());
    }

    #[test]
    fn test_compare_is_three_way() {
        assert_eq!(Value::int(1).compare(Value::int(2)), Ordering::Less);
        assert_eq!(Value::int(2).compare(Value::int(2)), Ordering::Equal);
        assert_eq!(Value::float(2.5).compare(Value::int(2)), Ordering::Greater);
        assert_eq!(Value::float(f64::NAN).compare(Value::int(0)), Ordering::Equal);
    }

    #[test]
    fn test_exact_int() {
        assert_eq!(Value::float(-10001.0).as_exact_int(), Some(-10001));
        assert_eq!(Value::float(-10001.5).as_exact_int(), None);
        assert_eq!(Value::int(4).as_exact_int(), Some(4));
    }
}
