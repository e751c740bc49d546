//! Input schemas of the Brale tools.

use std::collections::HashMap;

use brale_common::{Function, Parameters, Property, Tool};

use crate::args::IDEMPOTENCY_KEY_ARG;

pub(crate) fn definition(
    name: &str,
    description: &str,
    properties: Vec<(&str, Property)>,
    required: &[&str],
) -> Tool {
    let properties: HashMap<String, Property> = properties
        .into_iter()
        .map(|(key, property)| (key.to_string(), property))
        .collect();

    Tool::builder()
        .function(Function {
            name: name.to_string(),
            description: description.to_string(),
            parameters: Parameters::new(
                properties,
                required.iter().map(ToString::to_string).collect(),
            )
            .into(),
        })
        .build()
}

fn object(description: &str, properties: Vec<(&str, Property)>, required: &[&str]) -> Property {
    Property::object(
        description,
        properties
            .into_iter()
            .map(|(key, property)| (key.to_string(), property))
            .collect(),
        required.iter().map(ToString::to_string).collect(),
    )
}

pub(crate) fn account_id() -> (&'static str, Property) {
    ("account_id", Property::string("The ID of the account"))
}

pub(crate) fn idempotency_key() -> (&'static str, Property) {
    (
        IDEMPOTENCY_KEY_ARG,
        Property::string(
            "Key that lets the API deduplicate a repeated create. Reuse it when retrying the same request; a fresh key is generated when omitted",
        ),
    )
}

pub(crate) fn postal_address(description: &str) -> Property {
    object(
        description,
        vec![
            ("street_line_1", Property::string("Street address")),
            ("street_line_2", Property::string("Apartment, suite or unit")),
            ("city", Property::string("City")),
            ("state", Property::string("State or region")),
            ("zip", Property::string("Postal code")),
            ("country", Property::string("Country code")),
        ],
        &["street_line_1", "city", "state", "zip", "country"],
    )
}

pub(crate) fn business_controller() -> Property {
    object(
        "Person with significant control over the business",
        vec![
            ("name", Property::string("Full name")),
            ("ssn", Property::string("Social security number")),
            ("address", postal_address("Residential address")),
        ],
        &["name", "ssn", "address"],
    )
}

pub(crate) fn transfer_endpoint(description: &str) -> Property {
    object(
        description,
        vec![
            (
                "value_type",
                Property::string("Currency or stablecoin, e.g. USD or SBC"),
            ),
            (
                "transfer_type",
                Property::string("Rail or blockchain, e.g. wire, ach or solana"),
            ),
            ("address_id", Property::string("Address ID for on-chain endpoints")),
            (
                "financial_institution_id",
                Property::string("Financial institution ID for fiat endpoints"),
            ),
        ],
        &["value_type", "transfer_type"],
    )
}

pub(crate) fn amount() -> Property {
    object(
        "Amount to transfer",
        vec![
            ("value", Property::string("Decimal amount, e.g. \"100.00\"")),
            ("currency", Property::string("Currency code, e.g. USD")),
        ],
        &["value", "currency"],
    )
}

pub(crate) fn bank_details() -> Property {
    object(
        "Bank account details",
        vec![
            ("owner", Property::string("Account owner name")),
            ("account_number", Property::string("Bank account number")),
            ("routing_number", Property::string("Bank routing number")),
            ("name", Property::string("Bank name")),
            ("address", postal_address("Bank address")),
            (
                "account_type",
                Property::string("Account type, e.g. checking or savings"),
            ),
        ],
        &[
            "owner",
            "account_number",
            "routing_number",
            "name",
            "address",
            "account_type",
        ],
    )
}

pub(crate) fn automation_destination() -> Property {
    object(
        "Where minted funds are delivered",
        vec![
            ("address_id", Property::string("Destination address ID")),
            ("value_type", Property::string("Stablecoin to mint, e.g. SBC")),
            (
                "transfer_type",
                Property::string("Blockchain of the destination, e.g. solana"),
            ),
        ],
        &["address_id", "value_type", "transfer_type"],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_shape() {
        let tool = definition(
            "brale_get_account",
            "Retrieve a specific account by ID from Brale API",
            vec![account_id()],
            &["account_id"],
        );

        assert_eq!(tool.r#type, "function");
        assert_eq!(tool.function.name, "brale_get_account");
        let params = &tool.function.parameters;
        assert_eq!(params["type"], "object");
        assert_eq!(params["properties"]["account_id"]["type"], "string");
        assert_eq!(params["required"][0], "account_id");
    }

    #[test]
    fn test_nested_object_schema() {
        let property = transfer_endpoint("Source of funds");
        assert_eq!(property.prop_type, "object");

        let nested = property.properties.unwrap_or_default();
        assert!(nested.contains_key("financial_institution_id"));
        assert_eq!(
            property.required.unwrap_or_default(),
            vec!["value_type".to_string(), "transfer_type".to_string()]
        );
    }
}
