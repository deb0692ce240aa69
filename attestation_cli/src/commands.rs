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

use clap::Subcommand;
use std::path::PathBuf;
use tpm_common_verifier::AlgorithmId;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay an event log and print the expected PCR values
    Pcrs {
        /// Binary event log file
        #[clap(short, long, required = true)]
        log: PathBuf,

        /// Bank to print: sha1/sha256/sha384/sha512/sm3, default sha256 when present
        #[clap(short, long)]
        algorithm: Option<AlgorithmId>,

        /// The log file holds base64 text
        #[clap(long)]
        base64: bool,

        /// Output file address, default stdout
        #[clap(short, long)]
        out: Option<PathBuf>,
    },

    /// Print every event of a log as JSON
    Events {
        /// Binary event log file
        #[clap(short, long, required = true)]
        log: PathBuf,

        /// The log file holds base64 text
        #[clap(long)]
        base64: bool,

        /// Output file address, default stdout
        #[clap(short, long)]
        out: Option<PathBuf>,
    },

    /// Translate PCI ids of platform components into vendor and device names
    Translate {
        /// JSON file with a list of component identifiers
        #[clap(short, long, required = true)]
        components: PathBuf,

        /// PCI ids database, default the well-known system locations
        #[clap(short, long)]
        pci_ids: Option<PathBuf>,

        /// Output file address, default stdout
        #[clap(short, long)]
        out: Option<PathBuf>,
    },
}
