use eframe::egui::{self, Color32, RichText};
use rfd::FileDialog;

use super::{FlowPhase, MessageKind, PdfUploader, PreviewLine};
use crate::upload::DownloadLink;
use crate::utils::file_size::format_size;

const GREEN: Color32 = Color32::from_rgb(0, 180, 0);
const RED: Color32 = Color32::from_rgb(220, 50, 50);
const BLUE: Color32 = Color32::from_rgb(59, 130, 246);
const GRAY: Color32 = Color32::from_rgb(150, 150, 150);

impl PdfUploader {
    pub fn render(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(20.0);
                ui.vertical_centered(|ui| {
                    ui.heading("PDF Upload Tool");
                    ui.add_space(5.0);
                    ui.label(
                        RichText::new("Send a PDF to the processing server and download the results")
                            .color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                });

                ui.add_space(20.0);
                self.render_endpoint(ui);
                ui.add_space(10.0);
                self.render_file_picker(ui);
                ui.add_space(10.0);
                self.render_options(ui);
                ui.add_space(20.0);

                ui.vertical_centered(|ui| {
                    ui.add_enabled_ui(self.state.can_submit(), |ui| {
                        let button = egui::Button::new(self.state.submit_label())
                            .min_size(egui::vec2(200.0, 40.0));
                        if ui.add(button).clicked() {
                            self.start_submit();
                        }
                    });
                });

                ui.add_space(20.0);
                if self.state.phase != FlowPhase::Idle {
                    self.render_outcome(ui);
                }
                ui.add_space(20.0);
            });
        });
    }

    fn render_endpoint(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label("Server");
                ui.add(
                    egui::TextEdit::singleline(&mut self.state.endpoint)
                        .desired_width(ui.available_width() - 8.0)
                        .font(egui::TextStyle::Monospace),
                );
            });
        });
    }

    fn render_file_picker(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                let in_flight = self.state.phase == FlowPhase::Submitting;
                ui.add_enabled_ui(!in_flight, |ui| {
                    if ui.button("📁 Select PDF").clicked() {
                        if let Some(path) =
                            FileDialog::new().add_filter("PDF", &["pdf"]).pick_file()
                        {
                            self.on_file_picked(path);
                        }
                    }
                });
                if let Some(picked) = &self.state.picked {
                    ui.label(format!("{} ({})", picked.name, format_size(picked.size)));
                }
            });

            match &self.state.preview {
                Some(PreviewLine::Pending) => {
                    ui.colored_label(GRAY, "Counting pages…");
                }
                Some(PreviewLine::Pages(pages)) => {
                    ui.colored_label(GRAY, format!("{} pages", pages));
                }
                Some(PreviewLine::Unavailable(reason)) => {
                    ui.colored_label(GRAY, reason);
                }
                None => {}
            }

            if let Some(warning) = self.state.size_warning() {
                ui.colored_label(RED, warning);
            }
        });
    }

    fn render_options(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label("Processing options");
            ui.add_space(5.0);

            egui::Grid::new("options")
                .num_columns(2)
                .spacing([10.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Remove pages").on_hover_text_at_pointer(
                        "Comma-separated page numbers, e.g. 1,2,14",
                    );
                    ui.text_edit_singleline(&mut self.state.fields.remove_pages);
                    ui.end_row();

                    ui.label("Article ranges").on_hover_text_at_pointer(
                        "Comma-separated ranges, e.g. 3-7,8-12",
                    );
                    ui.text_edit_singleline(&mut self.state.fields.article_ranges);
                    ui.end_row();

                    ui.label("Merge pages")
                        .on_hover_text_at_pointer("Two page numbers to merge, e.g. 4,5");
                    ui.text_edit_singleline(&mut self.state.fields.merge_pages);
                    ui.end_row();

                    ui.label("Year");
                    ui.text_edit_singleline(&mut self.state.fields.year);
                    ui.end_row();

                    ui.label("Number");
                    ui.text_edit_singleline(&mut self.state.fields.number);
                    ui.end_row();
                });
        });
    }

    fn render_outcome(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            let progress_bar = egui::ProgressBar::new(self.state.progress_fraction())
                .show_percentage()
                .animate(self.state.phase == FlowPhase::Submitting)
                .fill(BLUE);
            ui.add(progress_bar);

            if let Some(status) = &self.state.status {
                ui.add_space(5.0);
                let color = match status.kind {
                    MessageKind::Success => GREEN,
                    MessageKind::Error => RED,
                };
                ui.colored_label(color, &status.text);
            }

            if !self.state.links.is_empty() {
                ui.add_space(10.0);
                let mut clicked: Option<DownloadLink> = None;
                for link in &self.state.links {
                    ui.horizontal(|ui| {
                        ui.label("⬇");
                        let label = egui::Label::new(RichText::new(link.label()).color(BLUE))
                            .sense(egui::Sense::click());
                        if ui
                            .add(label)
                            .on_hover_text_at_pointer(&link.href)
                            .clicked()
                        {
                            clicked = Some(link.clone());
                        }
                    });
                    ui.add_space(4.0);
                }
                if let Some(link) = clicked {
                    self.save_link(&link);
                }
            }

            if self.state.phase != FlowPhase::Submitting {
                ui.add_space(10.0);
                if ui.button("🗑 Clear").clicked() {
                    self.reset();
                }
            }
        });
    }
}
