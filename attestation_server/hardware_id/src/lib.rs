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

pub mod component;
pub mod error;
pub mod pci_ids;
pub mod translator;

pub use component::{
    AttributeStatus, CertificateIdentifier, ComponentAddress, ComponentClass, ComponentIdentifier,
    ComponentIdentifierV1, ComponentIdentifierV2, COMPCLASS_TCG_CAT_GFX, COMPCLASS_TCG_CAT_NIC,
    TCG_COMPONENT_REGISTRY_OID,
};
pub use error::HardwareIdError;
pub use pci_ids::{DeviceRecord, HardwareIdLookup, MockHardwareIdLookup, PciIds, VendorRecord, PCI_IDS_PATHS};
pub use translator::{translate, translate_device, translate_vendor, ComponentTranslator};
