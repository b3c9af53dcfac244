//! Confirmation dialog prefill.
//!
//! When the dialog opens, the data attributes of the control that opened it
//! are copied into the dialog's text targets and the form action is pointed
//! at the row's endpoint. Closing the dialog clears both.

use serde::Serialize;
use tf_common::RowId;
use tf_config::{ModalConfig, PrefillField, Translations};

use crate::bulk::endpoint_for;
use crate::document::TriggerNode;
use crate::logging::{event_names, LogContext, Stage};
use crate::view::TableView;

/// What the dialog shows for one trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prefill {
    pub trigger: String,
    pub id: Option<RowId>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Text written to each target element, in config order.
    pub texts: Vec<(String, String)>,
    pub form_action: Option<String>,
}

/// Binds one confirmation dialog to its trigger controls.
#[derive(Debug)]
pub struct ModalPrefillBinder {
    config: ModalConfig,
    translations: Translations,
    current: Option<Prefill>,
    ctx: LogContext,
}

impl ModalPrefillBinder {
    pub fn new(config: ModalConfig, translations: Translations, ctx: LogContext) -> Self {
        ModalPrefillBinder {
            config,
            translations,
            current: None,
            ctx,
        }
    }

    pub fn config(&self) -> &ModalConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Prefill of the open dialog.
    pub fn current(&self) -> Option<&Prefill> {
        self.current.as_ref()
    }

    /// Dialog opened by `trigger`: fill every target and set the form action.
    pub fn show(&mut self, trigger: &TriggerNode, view: &mut dyn TableView) -> &Prefill {
        let id = read_attr(trigger, &self.config.id_attribute).map(RowId::new);
        let name = read_attr(trigger, &self.config.name_attribute).map(str::to_string);
        let description = self
            .config
            .description_attribute
            .as_deref()
            .and_then(|attr| read_attr(trigger, attr))
            .map(str::to_string);

        let mut texts = Vec::with_capacity(self.config.targets.len());
        for target in &self.config.targets {
            let value = match target.field {
                PrefillField::Id => id.as_ref().map(|i| i.as_str().to_string()),
                PrefillField::Name => name.clone(),
                PrefillField::Description => description.clone(),
            };
            let text = value.unwrap_or_else(|| {
                target
                    .fallback_key
                    .as_deref()
                    .map(|key| self.translations.get(key).to_string())
                    .unwrap_or_default()
            });
            view.set_text(&target.element, &text);
            texts.push((target.element.clone(), text));
        }

        let form_action = id
            .as_ref()
            .map(|id| endpoint_for(&self.config.action_template, id));
        if let Some(form) = &self.config.form {
            view.set_form_action(form, form_action.as_deref());
        }

        match &id {
            Some(id) => crate::log_event!(
                self.ctx,
                DEBUG,
                event_names::MODAL_PREFILLED,
                Stage::Modal,
                "confirmation dialog prefilled",
                trigger = trigger.id.as_str(),
                row_id = id.as_str()
            ),
            None => crate::log_event!(
                self.ctx,
                WARN,
                event_names::MODAL_PREFILLED,
                Stage::Modal,
                "trigger has no id attribute; form action left unset",
                trigger = trigger.id.as_str(),
                attribute = self.config.id_attribute.as_str()
            ),
        }

        self.current.insert(Prefill {
            trigger: trigger.id.clone(),
            id,
            name,
            description,
            texts,
            form_action,
        })
    }

    /// Dialog closed: clear every target and the form action.
    pub fn hidden(&mut self, view: &mut dyn TableView) {
        for target in &self.config.targets {
            view.set_text(&target.element, "");
        }
        if let Some(form) = &self.config.form {
            view.set_form_action(form, None);
        }
        if self.current.take().is_some() {
            crate::log_event!(
                self.ctx,
                DEBUG,
                event_names::MODAL_CLEARED,
                Stage::Modal,
                "confirmation dialog cleared"
            );
        }
    }
}

fn read_attr<'a>(trigger: &'a TriggerNode, name: &str) -> Option<&'a str> {
    trigger.attr(name).map(str::trim).filter(|v| !v.is_empty())
}
