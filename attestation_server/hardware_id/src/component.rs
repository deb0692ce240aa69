/*
 * Copyright (c) Huawei Technologies Co., Ltd. 2025. All rights reserved.
 * Global Trust Authority is licensed under the Mulan PSL v2.
 * You can use this software according to the terms and conditions of the Mulan PSL v2.
 * You may obtain a copy of Mulan PSL v2 at:
 *     http://license.coscl.org.cn/MulanPSL2
 * THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY KIND, EITHER EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR
 * PURPOSE.
 * See the Mulan PSL v2 for more details.
 */

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// TCG component class registry
pub const TCG_COMPONENT_REGISTRY_OID: &str = "2.23.133.18.3.1";

/// Network interface controller category
pub const COMPCLASS_TCG_CAT_NIC: &str = "00090000";

/// Graphics adapter category
pub const COMPCLASS_TCG_CAT_GFX: &str = "00050000";

const CATEGORY_MASK: u32 = 0xFFFF_0000;

/// Registry OID plus the 32-bit class value, category in the upper 16 bits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentClass {
    #[serde(default = "default_registry")]
    pub registry: String,
    #[serde(with = "class_value")]
    pub value: u32,
}

fn default_registry() -> String {
    TCG_COMPONENT_REGISTRY_OID.to_string()
}

impl ComponentClass {
    pub fn new(value: u32) -> Self {
        Self { registry: default_registry(), value }
    }

    /// Category as 8 lower-case hex digits, e.g. `00090000`
    pub fn category(&self) -> String {
        format!("{:08x}", self.value & CATEGORY_MASK)
    }

    /// Whether components of this class carry PCI vendor/device ids
    pub fn is_pci_addressable(&self) -> bool {
        let category = self.category();
        category == COMPCLASS_TCG_CAT_NIC || category == COMPCLASS_TCG_CAT_GFX
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentAddress {
    pub address_type: String,
    pub address_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateIdentifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_cert_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_serial: Option<String>,
}

/// Delta platform certificate status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeStatus {
    Added,
    Modified,
    Removed,
}

/// Platform certificate component without class metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentIdentifierV1 {
    pub manufacturer: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_replaceable: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<ComponentAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentIdentifierV2 {
    pub component_class: ComponentClass,
    pub manufacturer: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_replaceable: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<ComponentAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_identifier: Option<CertificateIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_status: Option<AttributeStatus>,
}

impl ComponentIdentifierV2 {
    pub fn new(component_class: ComponentClass, manufacturer: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            component_class,
            manufacturer: manufacturer.into(),
            model: model.into(),
            serial: None,
            revision: None,
            manufacturer_id: None,
            field_replaceable: None,
            addresses: Vec::new(),
            certificate_identifier: None,
            platform_uri: None,
            attribute_status: None,
        }
    }
}

/// A component identifier in either certificate shape, tagged by `"version"` in JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "version")]
pub enum ComponentIdentifier {
    V1(ComponentIdentifierV1),
    V2(ComponentIdentifierV2),
}

impl ComponentIdentifier {
    pub fn manufacturer(&self) -> &str {
        match self {
            ComponentIdentifier::V1(component) => &component.manufacturer,
            ComponentIdentifier::V2(component) => &component.manufacturer,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            ComponentIdentifier::V1(component) => &component.model,
            ComponentIdentifier::V2(component) => &component.model,
        }
    }

    pub fn component_class(&self) -> Option<&ComponentClass> {
        match self {
            ComponentIdentifier::V1(_) => None,
            ComponentIdentifier::V2(component) => Some(&component.component_class),
        }
    }
}

/// Class values travel as 8 hex digit strings, optionally `0x` prefixed; plain numbers are accepted too
mod class_value {
    use super::*;
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawValue {
        Number(u32),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:08x}", value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        match RawValue::deserialize(deserializer)? {
            RawValue::Number(value) => Ok(value),
            RawValue::Text(text) => {
                let digits = text.trim();
                let digits = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")).unwrap_or(digits);
                u32::from_str_radix(digits, 16)
                    .map_err(|e| D::Error::custom(format!("invalid component class value {:?}: {}", text, e)))
            },
        }
    }
}
