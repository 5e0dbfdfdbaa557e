//! "Safe Storage" passwords Chromium browsers keep in the OS keyring
//!
//! The password is the PBKDF2 input for the AES key protecting cookie values:
//! the macOS keychain holds it for every cookie, GNOME keyring or KWallet for
//! `v11` cookies on Linux. Failures are logged and yield `None`, so cookies
//! that need the password are skipped rather than aborting extraction.

use crate::config::Browser;

/// Looks up the Safe Storage password of `browser`.
pub fn safe_storage_password(browser: Browser) -> Option<Vec<u8>> {
    let name = keyring_name(browser)?;
    let password = lookup(name);
    match &password {
        Some(_) => log::debug!("Read {} Safe Storage password from the keyring", name),
        None => log::info!("No {} Safe Storage password in the keyring", name),
    }
    password
}

/// Account/label prefix the browser stores its password under.
pub fn keyring_name(browser: Browser) -> Option<&'static str> {
    let name = if cfg!(target_os = "macos") {
        match browser {
            Browser::Chrome => "Chrome",
            Browser::Chromium => "Chromium",
            Browser::Edge => "Microsoft Edge",
            Browser::Brave => "Brave",
            Browser::Opera => "Opera",
            Browser::Vivaldi => "Vivaldi",
            Browser::Whale => "Whale",
            Browser::Firefox => return None,
        }
    } else {
        match browser {
            Browser::Chrome | Browser::Vivaldi => "Chrome",
            Browser::Chromium | Browser::Edge | Browser::Opera => "Chromium",
            Browser::Brave => "Brave",
            Browser::Whale => "Whale",
            Browser::Firefox => return None,
        }
    };
    Some(name)
}

#[cfg(target_os = "macos")]
fn lookup(name: &str) -> Option<Vec<u8>> {
    use security_framework::passwords::get_generic_password;

    let service = format!("{} Safe Storage", name);
    match get_generic_password(&service, name) {
        Ok(password) => Some(password),
        Err(err) => {
            log::warn!("Failed to read keychain password for {}: {}", name, err);
            None
        }
    }
}

#[cfg(target_os = "linux")]
fn lookup(name: &str) -> Option<Vec<u8>> {
    let keyring = linux::choose_keyring(&linux::SessionEnv::from_env());
    log::debug!("Using {:?} for the {} Safe Storage password", keyring, name);
    match keyring {
        linux::Keyring::KWallet(version) => linux::kwallet_password(name, version),
        linux::Keyring::Gnome => linux::gnome_keyring_password(name),
        linux::Keyring::BasicText => None,
    }
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn lookup(_name: &str) -> Option<Vec<u8>> {
    None
}

#[cfg(target_os = "linux")]
mod linux {
    use secret_service::blocking::SecretService;
    use secret_service::EncryptionType;
    use std::env;
    use std::process::Command;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Keyring {
        /// KWallet with the kwalletd major version (4, 5 or 6)
        KWallet(u8),
        Gnome,
        /// No keyring: the browser falls back to the fixed `peanuts` password
        BasicText,
    }

    /// Desktop session variables that decide which keyring the browser uses
    #[derive(Debug, Default)]
    pub struct SessionEnv {
        pub xdg_current_desktop: Option<String>,
        pub desktop_session: String,
        pub kde_session_version: Option<String>,
        pub gnome_session: bool,
        pub kde_full_session: bool,
    }

    impl SessionEnv {
        pub fn from_env() -> Self {
            Self {
                xdg_current_desktop: env::var("XDG_CURRENT_DESKTOP").ok(),
                desktop_session: env::var("DESKTOP_SESSION").unwrap_or_default(),
                kde_session_version: env::var("KDE_SESSION_VERSION").ok(),
                gnome_session: env::var("GNOME_DESKTOP_SESSION_ID").is_ok(),
                kde_full_session: env::var("KDE_FULL_SESSION").is_ok(),
            }
        }

        fn kde(&self) -> Keyring {
            match self.kde_session_version.as_deref() {
                Some("5") => Keyring::KWallet(5),
                Some("6") => Keyring::KWallet(6),
                Some(_) => Keyring::KWallet(4),
                // KDE 3 has no wallet Chromium talks to
                None => Keyring::BasicText,
            }
        }
    }

    pub fn choose_keyring(session: &SessionEnv) -> Keyring {
        if let Some(desktop) = &session.xdg_current_desktop {
            for part in desktop.split(':').map(str::trim) {
                match part {
                    "KDE" => {
                        return match session.kde() {
                            Keyring::BasicText => Keyring::KWallet(4),
                            keyring => keyring,
                        }
                    }
                    "LXQt" => return Keyring::BasicText,
                    "Unity" | "Deepin" | "GNOME" | "X-Cinnamon" | "Pantheon" | "XFCE"
                    | "UKUI" => return Keyring::Gnome,
                    _ => {}
                }
            }
        }

        match session.desktop_session.as_str() {
            "deepin" | "mate" | "gnome" | "ukui" | "xubuntu" => return Keyring::Gnome,
            "kde4" | "kde-plasma" => return Keyring::KWallet(4),
            "kde" => return session.kde(),
            other if other.contains("xfce") => return Keyring::Gnome,
            _ => {}
        }

        if session.gnome_session {
            Keyring::Gnome
        } else if session.kde_full_session {
            session.kde()
        } else {
            Keyring::BasicText
        }
    }

    pub fn kwallet_password(name: &str, version: u8) -> Option<Vec<u8>> {
        let wallet = kwallet_network_wallet(version);
        let output = Command::new("kwallet-query")
            .args([
                "--read-password",
                &format!("{} Safe Storage", name),
                "--folder",
                &format!("{} Keys", name),
                &wallet,
            ])
            .output();
        let output = match output {
            Ok(output) => output,
            Err(err) => {
                log::warn!("kwallet-query command failed: {}", err);
                return None;
            }
        };
        if !output.status.success() {
            log::warn!("kwallet-query failed with status {}", output.status);
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.to_lowercase().starts_with("failed to read") {
            log::debug!("kwallet has no {} Safe Storage entry", name);
            return None;
        }
        Some(stdout.trim_end_matches('\n').as_bytes().to_vec())
    }

    fn kwallet_network_wallet(version: u8) -> String {
        const DEFAULT_WALLET: &str = "kdewallet";
        let (service, path) = match version {
            5 => ("org.kde.kwalletd5", "/modules/kwalletd5"),
            6 => ("org.kde.kwalletd6", "/modules/kwalletd6"),
            _ => ("org.kde.kwalletd", "/modules/kwalletd"),
        };
        let output = Command::new("dbus-send")
            .args([
                "--session",
                "--print-reply=literal",
                &format!("--dest={}", service),
                path,
                "org.kde.KWallet.networkWallet",
            ])
            .output();
        match output {
            Ok(output) if output.status.success() => {
                parse_network_wallet(&String::from_utf8_lossy(&output.stdout))
                    .unwrap_or_else(|| DEFAULT_WALLET.to_string())
            }
            Ok(output) => {
                log::warn!("dbus-send failed with status {}", output.status);
                DEFAULT_WALLET.to_string()
            }
            Err(err) => {
                log::warn!("dbus-send failed: {}", err);
                DEFAULT_WALLET.to_string()
            }
        }
    }

    pub fn parse_network_wallet(reply: &str) -> Option<String> {
        let trimmed = reply.trim();
        if let Some(start) = trimmed.find("string \"") {
            let rest = &trimmed[start + "string \"".len()..];
            return rest.find('"').map(|end| rest[..end].to_string());
        }
        // --print-reply=literal prints the bare string
        (!trimmed.is_empty() && !trimmed.contains(char::is_whitespace))
            .then(|| trimmed.to_string())
    }

    pub fn gnome_keyring_password(name: &str) -> Option<Vec<u8>> {
        let service = match SecretService::connect(EncryptionType::Dh) {
            Ok(service) => service,
            Err(err) => {
                log::warn!("Failed to connect to secret service: {}", err);
                return None;
            }
        };
        let collection = match service
            .get_default_collection()
            .or_else(|_| service.get_any_collection())
        {
            Ok(collection) => collection,
            Err(err) => {
                log::warn!("Failed to read keyring collection: {}", err);
                return None;
            }
        };
        let items = match collection.get_all_items() {
            Ok(items) => items,
            Err(err) => {
                log::warn!("Failed to read keyring items: {}", err);
                return None;
            }
        };

        let label = format!("{} Safe Storage", name);
        let item = items
            .into_iter()
            .find(|item| item.get_label().map_or(false, |item_label| item_label == label))?;
        if item.is_locked().unwrap_or(false) {
            if let Err(err) = item.unlock() {
                log::warn!("Failed to unlock keyring item: {}", err);
            }
        }
        match item.get_secret() {
            Ok(secret) => Some(secret),
            Err(err) => {
                log::warn!("Failed to read keyring secret: {}", err);
                None
            }
        }
    }

}
