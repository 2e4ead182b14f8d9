use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    It,
}

impl Locale {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "it" => Some(Self::It),
            _ => None,
        }
    }
}

/// Looks up a translated string. Unknown keys come back unchanged so a
/// missing entry is visible on screen instead of silently empty.
pub fn t(key: &str, locale: Locale) -> String {
    let found = match locale {
        Locale::En => english(key),
        Locale::It => italian(key).or_else(|| english(key)),
    };
    found.unwrap_or(key).to_string()
}

fn english(key: &str) -> Option<&'static str> {
    let text = match key {
        "header.addPayment" => "Add Payment",
        "header.editPayment" => "Edit Payment",
        "header.sendMailPayment" => "Send Payment Receipt",
        "payments.date" => "Date",
        "payments.number" => "Payment Number",
        "payments.customer" => "Customer",
        "payments.customerPlaceholder" => "Select Customer",
        "payments.invoice" => "Invoice",
        "payments.invoicePlaceholder" => "Select Invoice",
        "payments.amount" => "Amount",
        "payments.mode" => "Payment Mode",
        "payments.modePlaceholder" => "Select Payment Mode",
        "payments.notes" => "Notes",
        "payments.insertNote" => "Insert Note",
        "payments.alertAmount" => "Payment amount cannot be greater than due amount",
        "payments.alertDescription" => "You will not be able to recover this payment",
        "payments.alert.sendPayment" => "Send this payment receipt to the customer?",
        "payments.receiptSent" => "Receipt sent",
        "payments.removePayment" => "Remove",
        "payments.sendReceipt" => "Send Receipt",
        "customers.title" => "Customers",
        "customers.add" => "New Customer",
        "customers.name" => "Name",
        "customers.email" => "Email",
        "invoices.title" => "Invoices",
        "notes.title" => "Notes",
        "customFields.title" => "Custom Fields",
        "mail.to" => "To",
        "mail.subject" => "Subject",
        "mail.body" => "Body",
        "mail.defaultSubject" => "New Payment Receipt",
        "mail.defaultBody" => "Please find the payment receipt attached.",
        "alert.title" => "Are you sure?",
        "button.save" => "Save",
        "button.send" => "Send",
        "button.cancel" => "Cancel",
        "button.ok" => "OK",
        "search.placeholder" => "Search...",
        "search.empty" => "No results",
        "loading" => "Loading...",
        "validation.required" => "Field is required",
        "validation.wrong" => "Something went wrong, please try again",
        "validation.alreadyTaken" => "This number is already taken",
        "validation.invalidDate" => "Use the YYYY-MM-DD format",
        "validation.invalidAmount" => "Enter a valid amount",
        _ => return None,
    };
    Some(text)
}

fn italian(key: &str) -> Option<&'static str> {
    let text = match key {
        "header.addPayment" => "Nuovo pagamento",
        "header.editPayment" => "Modifica pagamento",
        "header.sendMailPayment" => "Invia ricevuta",
        "payments.date" => "Data",
        "payments.number" => "Numero pagamento",
        "payments.customer" => "Cliente",
        "payments.customerPlaceholder" => "Seleziona cliente",
        "payments.invoice" => "Fattura",
        "payments.invoicePlaceholder" => "Seleziona fattura",
        "payments.amount" => "Importo",
        "payments.mode" => "Metodo di pagamento",
        "payments.modePlaceholder" => "Seleziona metodo",
        "payments.notes" => "Note",
        "payments.insertNote" => "Inserisci nota",
        "payments.alertAmount" => "L'importo non puo' superare il dovuto",
        "payments.alertDescription" => "Il pagamento non potra' essere recuperato",
        "payments.alert.sendPayment" => "Inviare la ricevuta al cliente?",
        "payments.receiptSent" => "Ricevuta inviata",
        "payments.removePayment" => "Elimina",
        "payments.sendReceipt" => "Invia ricevuta",
        "customers.title" => "Clienti",
        "customers.add" => "Nuovo cliente",
        "customers.name" => "Nome",
        "invoices.title" => "Fatture",
        "notes.title" => "Note",
        "customFields.title" => "Campi personalizzati",
        "mail.to" => "A",
        "mail.subject" => "Oggetto",
        "mail.body" => "Testo",
        "mail.defaultSubject" => "Nuova ricevuta di pagamento",
        "mail.defaultBody" => "In allegato la ricevuta del pagamento.",
        "alert.title" => "Sei sicuro?",
        "button.save" => "Salva",
        "button.send" => "Invia",
        "button.cancel" => "Annulla",
        "search.placeholder" => "Cerca...",
        "search.empty" => "Nessun risultato",
        "loading" => "Caricamento...",
        "validation.required" => "Campo obbligatorio",
        "validation.wrong" => "Qualcosa e' andato storto, riprova",
        "validation.alreadyTaken" => "Numero gia' in uso",
        "validation.invalidDate" => "Usa il formato AAAA-MM-GG",
        "validation.invalidAmount" => "Importo non valido",
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_key_is_returned_verbatim() {
        assert_eq!(t("nope.missing", Locale::En), "nope.missing");
    }

    #[test]
    fn italian_falls_back_to_english() {
        assert_eq!(t("customers.email", Locale::It), "Email");
        assert_eq!(t("button.save", Locale::It), "Salva");
    }

    #[test]
    fn locale_parse_is_case_insensitive() {
        assert_eq!(Locale::parse("IT"), Some(Locale::It));
        assert_eq!(Locale::parse("fr"), None);
    }
}
