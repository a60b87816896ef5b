use crate::bitmap::Bitmap;
use crate::refs::{ObjectReferences, RefType};
use image::GenericImageView;
use miniz_oxide::deflate::{compress_to_vec_zlib, CompressionLevel};
use pdf_writer::{Filter, Finish, Pdf};

/// An image as it will be embedded in the PDF. Pixel data is encoded as soon as the image is
/// created, so the decoded [Bitmap] it came from can be released straight away.
pub struct Image {
    filter: Filter,
    bytes: Vec<u8>,
    mask: Option<Vec<u8>>,
    pub width: u32,
    pub height: u32,
}

impl Image {
    pub fn encode(bitmap: &Bitmap) -> Image {
        let (width, height) = (bitmap.width(), bitmap.height());

        if let Some(jpeg) = &bitmap.jpeg {
            // we can embed it directly!
            return Image {
                filter: Filter::DctDecode,
                bytes: jpeg.clone(),
                mask: None,
                width,
                height,
            };
        }

        let image = &bitmap.image;
        let level = CompressionLevel::DefaultLevel as u8;
        let mask = image.color().has_alpha().then(|| {
            let alphas: Vec<u8> = image.pixels().map(|p| (p.2).0[3]).collect();
            compress_to_vec_zlib(&alphas, level)
        });
        let bytes = compress_to_vec_zlib(image.to_rgb8().as_raw(), level);

        Image {
            filter: Filter::FlateDecode,
            bytes,
            mask,
            width,
            height,
        }
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, image_index: usize, writer: &mut Pdf) {
        let id = refs.gen(RefType::Image(image_index));
        let mask_id = self
            .mask
            .as_ref()
            .map(|_| refs.gen(RefType::ImageMask(image_index)));

        let mut image = writer.image_xobject(id, self.bytes.as_slice());
        image.filter(self.filter);
        image.width(self.width as i32);
        image.height(self.height as i32);
        image.color_space().device_rgb();
        image.bits_per_component(8);
        if let Some(mask_id) = mask_id {
            image.s_mask(mask_id);
        }
        image.finish();

        // add a transparency mask if we have one
        if let (Some(mask_id), Some(mask)) = (mask_id, self.mask.as_ref()) {
            let mut s_mask = writer.image_xobject(mask_id, mask.as_slice());
            s_mask.filter(Filter::FlateDecode);
            s_mask.width(self.width as i32);
            s_mask.height(self.height as i32);
            s_mask.color_space().device_gray();
            s_mask.bits_per_component(8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};

    #[test]
    fn opaque_images_have_no_mask() {
        let image = Image::encode(&Bitmap::new(DynamicImage::new_rgb8(4, 3)));
        assert_eq!((image.width, image.height), (4, 3));
        assert!(image.mask.is_none());
        assert_eq!(image.filter, Filter::FlateDecode);
    }

    #[test]
    fn translucent_images_carry_a_soft_mask() {
        let pixels = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 128]));
        let image = Image::encode(&Bitmap::new(DynamicImage::ImageRgba8(pixels)));
        let mask = image.mask.expect("has mask");
        let alphas = miniz_oxide::inflate::decompress_to_vec_zlib(&mask).unwrap();
        assert_eq!(alphas, vec![128; 4]);
    }

    #[test]
    fn jpeg_data_is_passed_through() {
        let mut bitmap = Bitmap::new(DynamicImage::new_rgb8(1, 1));
        bitmap.jpeg = Some(vec![0xFF, 0xD8, 0xFF]);
        let image = Image::encode(&bitmap);
        assert_eq!(image.filter, Filter::DctDecode);
        assert_eq!(image.bytes, vec![0xFF, 0xD8, 0xFF]);
    }
}
