use std::fmt::{self, Display, Formatter};

use lazy_static::lazy_static;
use num_format::{Locale, SystemLocale, ToFormattedString, WriteFormatted};

lazy_static! {
    // `None` when the environment names a locale the system can't load.
    static ref DEFAULT_SYSTEM_LOCALE: Option<SystemLocale> = SystemLocale::default().ok();
}

/// Formats a count with the user's digit grouping, falling back to `1,234` style.
pub struct LocaleFormat<'a, N: ToFormattedString>(pub &'a N);

impl<'a, N: ToFormattedString> Display for LocaleFormat<'a, N> {
    fn fmt(&self, mut f: &mut Formatter) -> fmt::Result {
        let result = match &*DEFAULT_SYSTEM_LOCALE {
            Some(locale) => f.write_formatted(self.0, locale),
            None => f.write_formatted(self.0, &Locale::en),
        };
        result.map(|_| ()).map_err(|_| fmt::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::LocaleFormat;

    #[test]
    fn small_counts_are_plain() {
        assert_eq!(LocaleFormat(&42u32).to_string(), "42");
    }
}
