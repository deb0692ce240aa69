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

use log::debug;

use crate::component::{ComponentIdentifier, ComponentIdentifierV2};
use crate::pci_ids::{normalize_id, HardwareIdLookup, PciIds};

/// Rewrites numeric PCI ids of components into vendor and device names
pub struct ComponentTranslator<'a> {
    lookup: &'a dyn HardwareIdLookup,
}

impl Default for ComponentTranslator<'static> {
    fn default() -> Self {
        Self::new(PciIds::global())
    }
}

impl<'a> ComponentTranslator<'a> {
    pub fn new(lookup: &'a dyn HardwareIdLookup) -> Self {
        Self { lookup }
    }

    /// Translates every V2 component whose class is a NIC or graphics adapter.
    ///
    /// V1 components and other categories are returned as they are. The output has the
    /// same length and order as `components`.
    pub fn translate(&self, components: &[ComponentIdentifier]) -> Vec<ComponentIdentifier> {
        components
            .iter()
            .map(|component| match component {
                ComponentIdentifier::V1(_) => component.clone(),
                ComponentIdentifier::V2(v2) => ComponentIdentifier::V2(self.translate_component(v2)),
            })
            .collect()
    }

    pub fn translate_component(&self, component: &ComponentIdentifierV2) -> ComponentIdentifierV2 {
        if !component.component_class.is_pci_addressable() {
            return component.clone();
        }

        let manufacturer = self.translate_vendor(&component.manufacturer);
        // keyed by the original id, not the substituted vendor name
        let model = self.translate_device(&component.manufacturer, &component.model);
        if manufacturer != component.manufacturer || model != component.model {
            debug!(
                "Translated component {}/{} to {}/{}",
                component.manufacturer, component.model, manufacturer, model
            );
        }
        ComponentIdentifierV2 { manufacturer, model, ..component.clone() }
    }

    /// Vendor name for a 4 hex digit manufacturer, otherwise the manufacturer unchanged
    pub fn translate_vendor(&self, manufacturer: &str) -> String {
        let Some(vendor_id) = normalize_id(manufacturer) else {
            return manufacturer.to_string();
        };
        match self.lookup.find_vendor(&vendor_id) {
            Some(name) if !name.is_empty() => name,
            _ => manufacturer.to_string(),
        }
    }

    /// Device name when both ids are 4 hex digits, otherwise the model unchanged
    pub fn translate_device(&self, manufacturer: &str, model: &str) -> String {
        let (Some(vendor_id), Some(device_id)) = (normalize_id(manufacturer), normalize_id(model)) else {
            return model.to_string();
        };
        match self.lookup.find_device(&vendor_id, &device_id) {
            Some(name) if !name.is_empty() => name,
            _ => model.to_string(),
        }
    }
}

/// [`ComponentTranslator::translate`] against the process-wide database
pub fn translate(components: &[ComponentIdentifier]) -> Vec<ComponentIdentifier> {
    ComponentTranslator::default().translate(components)
}

pub fn translate_vendor(manufacturer: &str) -> String {
    ComponentTranslator::default().translate_vendor(manufacturer)
}

pub fn translate_device(manufacturer: &str, model: &str) -> String {
    ComponentTranslator::default().translate_device(manufacturer, model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentClass, ComponentIdentifierV1};
    use crate::pci_ids::MockHardwareIdLookup;
    use mockall::predicate::eq;

    fn nic(manufacturer: &str, model: &str) -> ComponentIdentifierV2 {
        ComponentIdentifierV2::new(ComponentClass::new(0x0009_0002), manufacturer, model)
    }

    #[test]
    fn test_hex_id_check() {
        assert_eq!(normalize_id("8086").as_deref(), Some("8086"));
        assert_eq!(normalize_id(" 10DE ").as_deref(), Some("10de"));
        assert!(normalize_id("808").is_none());
        assert!(normalize_id("80861").is_none());
        assert!(normalize_id("Acme Corp").is_none());
        assert!(normalize_id("0x80").is_none());
        assert!(normalize_id("ab\u{e9}").is_none());
    }

    #[test]
    fn test_device_lookup_uses_lower_case_ids() {
        let mut lookup = MockHardwareIdLookup::new();
        lookup
            .expect_find_device()
            .with(eq("10de"), eq("1eb8"))
            .times(1)
            .returning(|_, _| Some("TU104GL [Tesla T4]".to_string()));
        let translator = ComponentTranslator::new(&lookup);
        assert_eq!(translator.translate_device("10DE ", " 1EB8"), "TU104GL [Tesla T4]");
    }

    #[test]
    fn test_non_hex_vendor_skips_lookup() {
        let mut lookup = MockHardwareIdLookup::new();
        lookup.expect_find_vendor().never();
        let translator = ComponentTranslator::new(&lookup);
        assert_eq!(translator.translate_vendor("Acme Corp"), "Acme Corp");
    }

    #[test]
    fn test_vendor_lookup_uses_lower_case_id() {
        let mut lookup = MockHardwareIdLookup::new();
        lookup
            .expect_find_vendor()
            .with(eq("10de"))
            .times(1)
            .returning(|_| Some("NVIDIA Corporation".to_string()));
        let translator = ComponentTranslator::new(&lookup);
        assert_eq!(translator.translate_vendor(" 10DE"), "NVIDIA Corporation");
    }

    #[test]
    fn test_empty_name_keeps_original() {
        let mut lookup = MockHardwareIdLookup::new();
        lookup.expect_find_vendor().returning(|_| Some(String::new()));
        lookup.expect_find_device().returning(|_, _| None);
        let translator = ComponentTranslator::new(&lookup);
        assert_eq!(translator.translate_vendor("8086"), "8086");
        assert_eq!(translator.translate_device("8086", "100e"), "100e");
    }

    #[test]
    fn test_device_requires_both_ids() {
        let mut lookup = MockHardwareIdLookup::new();
        lookup.expect_find_device().never();
        let translator = ComponentTranslator::new(&lookup);
        assert_eq!(translator.translate_device("Intel", "100e"), "100e");
        assert_eq!(translator.translate_device("8086", "82540EM"), "82540EM");
    }

    #[test]
    fn test_device_keyed_by_original_manufacturer() {
        let mut lookup = MockHardwareIdLookup::new();
        lookup.expect_find_vendor().returning(|_| Some("Intel Corporation".to_string()));
        lookup
            .expect_find_device()
            .with(eq("8086"), eq("100e"))
            .times(1)
            .returning(|_, _| Some("82540EM Gigabit Ethernet Controller".to_string()));
        let translator = ComponentTranslator::new(&lookup);

        let translated = translator.translate_component(&nic("8086", "100e"));
        assert_eq!(translated.manufacturer, "Intel Corporation");
        assert_eq!(translated.model, "82540EM Gigabit Ethernet Controller");
    }

    #[test]
    fn test_vendor_and_device_are_independent() {
        let mut lookup = MockHardwareIdLookup::new();
        lookup.expect_find_vendor().returning(|_| None);
        lookup.expect_find_device().returning(|_, _| Some("Some Device".to_string()));
        let translator = ComponentTranslator::new(&lookup);

        let translated = translator.translate_component(&nic("1234", "5678"));
        assert_eq!(translated.manufacturer, "1234");
        assert_eq!(translated.model, "Some Device");
    }

    #[test]
    fn test_v1_and_other_categories_are_untouched() {
        let mut lookup = MockHardwareIdLookup::new();
        lookup.expect_find_vendor().never();
        lookup.expect_find_device().never();
        let translator = ComponentTranslator::new(&lookup);

        let v1 = ComponentIdentifier::V1(ComponentIdentifierV1 {
            manufacturer: "8086".to_string(),
            model: "100e".to_string(),
            serial: None,
            revision: None,
            manufacturer_id: None,
            field_replaceable: None,
            addresses: Vec::new(),
        });
        let memory = ComponentIdentifier::V2(ComponentIdentifierV2::new(ComponentClass::new(0x0014_0002), "8086", "100e"));
        let components = vec![v1, memory];
        assert_eq!(translator.translate(&components), components);
    }
}
