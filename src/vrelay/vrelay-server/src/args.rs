/*
 * vRelay HTTP to SMTP relay gateway
 * Copyright (C) 2023 viridIT SAS
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or any later version.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT
 * ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
 * FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License along with
 * this program. If not, see https://www.gnu.org/licenses/.
 *
*/

/// The command line arguments of the gateway.
#[derive(Debug, PartialEq, Eq, clap::Parser)]
#[command(about, version, author)]
pub struct Args {
    /// Path of the TOML configuration file. Without it every field takes
    /// its default.
    #[arg(short, long)]
    pub config: Option<std::path::PathBuf>,

    /// Load and validate the configuration, print it, then exit.
    #[arg(long)]
    pub check_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn flags_parse() {
        assert_eq!(
            Args::try_parse_from(["vrelay", "-c", "/etc/vrelay/vrelay.toml"]).unwrap(),
            Args {
                config: Some("/etc/vrelay/vrelay.toml".into()),
                check_config: false,
            }
        );
        assert_eq!(
            Args::try_parse_from(["vrelay", "--check-config"]).unwrap(),
            Args {
                config: None,
                check_config: true,
            }
        );
    }
}
