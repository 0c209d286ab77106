//! Parsing of follow-up replies.
//!
//! A suspended run asks for one field. The customer can answer with a
//! bare value ("4") or name the field explicitly ("PaymentMethodID=4"),
//! which also lets them supply a different identifier than the one
//! asked for, such as an email instead of a user ID.

use crossdesk_domain::EntityField;

/// Splits a reply into the field it fills and its value.
///
/// A `name=value` reply wins when the name parses as a known field;
/// anything else is taken as a bare value for `requested`. Returns
/// `None` when the reply carries no value at all.
pub fn parse_reply(requested: EntityField, reply: &str) -> Option<(EntityField, String)> {
    let reply = reply.trim();
    if reply.is_empty() {
        return None;
    }

    if let Some((name, value)) = reply.split_once('=')
        && let Ok(field) = name.trim().parse::<EntityField>()
    {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        return Some((field, value.to_string()));
    }

    Some((requested, reply.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_value_fills_the_requested_field() {
        let parsed = parse_reply(EntityField::PaymentMethodId, " 4 ");
        assert_eq!(parsed, Some((EntityField::PaymentMethodId, "4".to_string())));
    }

    #[test]
    fn test_named_field_overrides_the_request() {
        let parsed = parse_reply(EntityField::UserId, "Email=alice@example.com");
        assert_eq!(
            parsed,
            Some((EntityField::Email, "alice@example.com".to_string()))
        );
    }

    #[test]
    fn test_field_names_accept_aliases() {
        let parsed = parse_reply(EntityField::OrderId, "order_id = 7");
        assert_eq!(parsed, Some((EntityField::OrderId, "7".to_string())));
    }

    #[test]
    fn test_unknown_name_is_treated_as_a_value() {
        // An email address contains no '=', but a value that happens to
        // look like an assignment should not be swallowed.
        let parsed = parse_reply(EntityField::Email, "a=b");
        assert_eq!(parsed, Some((EntityField::Email, "a=b".to_string())));
    }

    #[test]
    fn test_empty_replies_are_rejected() {
        assert_eq!(parse_reply(EntityField::OrderId, "   "), None);
        assert_eq!(parse_reply(EntityField::OrderId, "OrderID="), None);
    }
}
